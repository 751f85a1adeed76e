use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "plenum")]
#[command(version, about = "An offline-first manager for collaborative meeting minutes")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a plenum workspace in the current directory
    Init,

    /// Manage the meeting series known to this workspace
    Series(SeriesCommand),

    /// Manage meeting minutes
    Minutes(MinutesCommand),

    /// Manage topics within one meeting's minutes
    Topic(TopicCommand),

    /// List remote calls waiting to be shipped
    Outbox {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply queued remote calls to the local cache
    Sync,
}

#[derive(Args, Debug)]
pub struct SeriesCommand {
    #[command(subcommand)]
    pub action: SeriesAction,
}

#[derive(Subcommand, Debug)]
pub enum SeriesAction {
    /// Register a meeting series in the local cache
    Add {
        /// Project the series belongs to
        project: String,

        /// Series name
        name: String,

        /// Moderators (can be specified multiple times)
        #[arg(long = "moderator", short = 'm')]
        moderators: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List known meeting series
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct MinutesCommand {
    #[command(subcommand)]
    pub action: MinutesAction,
}

#[derive(Subcommand, Debug)]
pub enum MinutesAction {
    /// Create minutes for a new meeting
    New {
        /// Id of the owning meeting series
        #[arg(long)]
        series: String,

        /// Meeting date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Participants, free text
        #[arg(long, default_value = "")]
        participants: String,

        /// Agenda, free text
        #[arg(long, default_value = "")]
        agenda: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List cached minutes
    List {
        /// Restrict to one meeting series
        #[arg(long)]
        series: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one meeting's minutes
    Show {
        /// Minutes id
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update fields of one meeting's minutes
    Update {
        /// Minutes id
        id: String,

        /// New meeting date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// New participants text
        #[arg(long)]
        participants: Option<String>,

        /// New agenda text
        #[arg(long)]
        agenda: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Request the finalize transition for one meeting's minutes
    Finalize {
        /// Minutes id
        id: String,
    },

    /// Request the unfinalize transition for one meeting's minutes
    Unfinalize {
        /// Minutes id
        id: String,
    },
}

#[derive(Args, Debug)]
pub struct TopicCommand {
    #[command(subcommand)]
    pub action: TopicAction,
}

#[derive(Subcommand, Debug)]
pub enum TopicAction {
    /// Add a topic to a meeting's minutes
    Add {
        /// Minutes id
        minutes_id: String,

        /// Topic subject
        subject: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit an existing topic
    Edit {
        /// Minutes id
        minutes_id: String,

        /// Topic id
        topic_id: String,

        /// New subject
        #[arg(long)]
        subject: Option<String>,

        /// Close the discussion on this topic
        #[arg(long, conflicts_with = "reopen")]
        close: bool,

        /// Reopen the discussion on this topic
        #[arg(long, conflicts_with = "close")]
        reopen: bool,
    },

    /// Remove a topic from a meeting's minutes
    Remove {
        /// Minutes id
        minutes_id: String,

        /// Topic id
        topic_id: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// List the topics of a meeting's minutes
    List {
        /// Minutes id
        minutes_id: String,

        /// Only topics marked new
        #[arg(long, conflicts_with = "closed")]
        new: bool,

        /// Only carried-over topics whose discussion is closed
        #[arg(long, conflicts_with = "new")]
        closed: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
