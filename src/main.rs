use clap::Parser;
use plenum::cli::{
    handle_init, handle_minutes_finalize, handle_minutes_list, handle_minutes_new,
    handle_minutes_show, handle_minutes_unfinalize, handle_minutes_update, handle_outbox,
    handle_series_add, handle_series_list, handle_sync, handle_topic_add, handle_topic_edit,
    handle_topic_list, handle_topic_remove, Cli, Commands, MinutesAction, SeriesAction,
    TopicAction,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => handle_init(),
        Commands::Series(series) => match series.action {
            SeriesAction::Add {
                project,
                name,
                moderators,
                json,
            } => handle_series_add(project, name, moderators, json),
            SeriesAction::List { json } => handle_series_list(json),
        },
        Commands::Minutes(minutes) => match minutes.action {
            MinutesAction::New {
                series,
                date,
                participants,
                agenda,
                json,
            } => handle_minutes_new(series, date, participants, agenda, json),
            MinutesAction::List { series, json } => handle_minutes_list(series, json),
            MinutesAction::Show { id, json } => handle_minutes_show(id, json),
            MinutesAction::Update {
                id,
                date,
                participants,
                agenda,
                json,
            } => handle_minutes_update(id, date, participants, agenda, json),
            MinutesAction::Finalize { id } => handle_minutes_finalize(id),
            MinutesAction::Unfinalize { id } => handle_minutes_unfinalize(id),
        },
        Commands::Topic(topic) => match topic.action {
            TopicAction::Add {
                minutes_id,
                subject,
                json,
            } => handle_topic_add(minutes_id, subject, json),
            TopicAction::Edit {
                minutes_id,
                topic_id,
                subject,
                close,
                reopen,
            } => handle_topic_edit(minutes_id, topic_id, subject, close, reopen),
            TopicAction::Remove {
                minutes_id,
                topic_id,
                force,
            } => handle_topic_remove(minutes_id, topic_id, force),
            TopicAction::List {
                minutes_id,
                new,
                closed,
                json,
            } => handle_topic_list(minutes_id, new, closed, json),
        },
        Commands::Outbox { json } => handle_outbox(json),
        Commands::Sync => handle_sync(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
