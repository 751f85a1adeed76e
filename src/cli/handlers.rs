use std::env;
use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::SqliteCache;
use crate::config::Config;
use crate::document::{ClientContext, MeetingSeries, Minutes};
use crate::entity::{MinutesRecord, MinutesUpdate, SeriesRecord, Topic, TopicDoc};
use crate::error::{PlenumError, Result};
use crate::gateway::{OutboxGateway, MINUTES_FINALIZE, MINUTES_INSERT, MINUTES_UNFINALIZE};
use crate::sync::{self, Applied};

const PLENUM_DIR: &str = ".plenum";

/// Find the workspace root by looking for .plenum/ or .git/
fn find_workspace_root() -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut current = cwd.as_path();
    loop {
        if current.join(PLENUM_DIR).exists() || current.join(".git").exists() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return cwd,
        }
    }
}

fn short(id: &str) -> &str {
    &id[..id.len().min(8)]
}

struct Workspace {
    config: Config,
    cache: Arc<SqliteCache>,
    outbox: Arc<OutboxGateway>,
}

impl Workspace {
    fn open() -> Result<Self> {
        let dir = find_workspace_root().join(PLENUM_DIR);
        if !dir.exists() {
            return Err(PlenumError::NotInitialized);
        }

        Ok(Self {
            config: Config::load(&dir)?,
            cache: Arc::new(SqliteCache::open(&dir)?),
            outbox: Arc::new(OutboxGateway::open(&dir)?),
        })
    }

    fn context(&self) -> ClientContext {
        ClientContext::new(
            self.cache.clone(),
            self.outbox.clone(),
            self.config.current_user.clone(),
        )
    }

    fn autosync(&self) -> Result<Vec<Applied>> {
        if self.config.autosync {
            sync::apply_pending(&self.outbox, &self.cache)
        } else {
            Ok(Vec::new())
        }
    }
}

pub fn handle_init() -> Result<()> {
    let root = env::current_dir()?;
    let dir = root.join(PLENUM_DIR);

    if dir.exists() {
        return Err(PlenumError::AlreadyInitialized);
    }

    fs::create_dir_all(&dir)?;
    SqliteCache::open(&dir)?;
    OutboxGateway::open(&dir)?;
    Config::default().save(&dir)?;

    println!("Initialized plenum workspace in {}", root.display());
    Ok(())
}

pub fn handle_series_add(
    project: String,
    name: String,
    moderators: Vec<String>,
    json: bool,
) -> Result<()> {
    let ws = Workspace::open()?;

    let mut series = SeriesRecord::new(project, name);
    series.moderators = moderators;
    // Whoever registers the series moderates it, unless told otherwise.
    if series.moderators.is_empty() {
        if let Some(user) = &ws.config.current_user {
            series.moderators.push(user.clone());
        }
    }

    ws.cache.upsert_series(&series)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&series)?);
    } else {
        println!(
            "Registered series {} - {} / {}",
            short(&series.id),
            series.project,
            series.name
        );
    }
    Ok(())
}

pub fn handle_series_list(json: bool) -> Result<()> {
    let ws = Workspace::open()?;
    let series = ws.cache.list_series()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }

    if series.is_empty() {
        println!("No meeting series found");
        return Ok(());
    }

    for s in &series {
        match &s.last_minutes_date {
            Some(date) => println!(
                "{} {} / {} (last minutes {})",
                short(&s.id),
                s.project,
                s.name,
                date
            ),
            None => println!("{} {} / {}", short(&s.id), s.project, s.name),
        }
    }
    Ok(())
}

pub fn handle_minutes_new(
    series: String,
    date: String,
    participants: String,
    agenda: String,
    json: bool,
) -> Result<()> {
    let ws = Workspace::open()?;
    let ctx = ws.context();

    // Resolve the series before creating anything; an unknown id should
    // fail here, not at sync time.
    let mut parent = MeetingSeries::load(ctx.clone(), &series)?;

    let mut record = MinutesRecord::new(series, date.clone());
    record.participants = participants;
    record.agenda = agenda;

    let mut minutes = Minutes::from_record(ctx, record);
    minutes.save(None, None)?;
    parent.update_last_minutes_date(&date, None);

    let applied = ws.autosync()?;
    match applied.iter().find(|a| a.method == MINUTES_INSERT) {
        Some(inserted) => {
            if json {
                let cached = ws.cache.list_minutes(None)?;
                let record = cached
                    .iter()
                    .find(|m| m.id.as_deref() == Some(inserted.id.as_str()));
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("Created minutes {} for {}", short(&inserted.id), date);
            }
        }
        None => println!(
            "Queued minutes for {} ({} call(s) pending)",
            date,
            ws.outbox.len()?
        ),
    }
    Ok(())
}

pub fn handle_minutes_list(series: Option<String>, json: bool) -> Result<()> {
    let ws = Workspace::open()?;
    let minutes = ws.cache.list_minutes(series.as_deref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&minutes)?);
        return Ok(());
    }

    if minutes.is_empty() {
        println!("No minutes found");
        return Ok(());
    }

    for m in &minutes {
        let id = m.id.as_deref().unwrap_or("-");
        let state = if m.is_finalized { " [finalized]" } else { "" };
        println!("{} {} {} topic(s){}", m.date, short(id), m.topics.len(), state);
    }
    Ok(())
}

pub fn handle_minutes_show(id: String, json: bool) -> Result<()> {
    let ws = Workspace::open()?;
    let minutes = Minutes::load(ws.context(), &id)?;
    let record = minutes.record();

    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    println!("Minutes {} - {}", short(&id), record.date);
    println!("  series: {}", record.meeting_series_id);
    println!(
        "  state: {}",
        if record.is_finalized {
            "finalized"
        } else {
            "unfinalized"
        }
    );
    if !record.participants.is_empty() {
        println!("  participants: {}", record.participants);
    }
    if !record.agenda.is_empty() {
        println!("  agenda: {}", record.agenda);
    }
    for topic in &record.topics {
        println!("  - {}", format_topic(topic));
    }
    Ok(())
}

fn format_topic(topic: &Topic) -> String {
    let mut flags = vec![if topic.is_open { "open" } else { "closed" }];
    if topic.is_new {
        flags.push("new");
    }
    format!("{} {} [{}]", short(&topic.id), topic.subject, flags.join(", "))
}

pub fn handle_minutes_update(
    id: String,
    date: Option<String>,
    participants: Option<String>,
    agenda: Option<String>,
    json: bool,
) -> Result<()> {
    let ws = Workspace::open()?;
    let mut minutes = Minutes::load(ws.context(), &id)?;

    minutes.update(
        MinutesUpdate {
            date,
            participants,
            agenda,
            topics: None,
        },
        None,
    )?;
    ws.autosync()?;

    if json {
        println!("{}", serde_json::to_string_pretty(minutes.record())?);
    } else {
        println!("Updated minutes {}", short(&id));
    }
    Ok(())
}

pub fn handle_minutes_finalize(id: String) -> Result<()> {
    let ws = Workspace::open()?;
    let minutes = Minutes::load(ws.context(), &id)?;

    minutes.finalize(None);

    let applied = ws.autosync()?;
    if applied.iter().any(|a| a.method == MINUTES_FINALIZE) {
        println!("Finalized minutes {}", short(&id));
    } else {
        println!("Queued finalize for minutes {}", short(&id));
    }
    Ok(())
}

pub fn handle_minutes_unfinalize(id: String) -> Result<()> {
    let ws = Workspace::open()?;
    let minutes = Minutes::load(ws.context(), &id)?;

    minutes.unfinalize(None);

    let applied = ws.autosync()?;
    if applied.iter().any(|a| a.method == MINUTES_UNFINALIZE) {
        println!("Unfinalized minutes {}", short(&id));
    } else {
        println!("Queued unfinalize for minutes {}", short(&id));
    }
    Ok(())
}

pub fn handle_topic_add(minutes_id: String, subject: String, json: bool) -> Result<()> {
    let ws = Workspace::open()?;
    let mut minutes = Minutes::load(ws.context(), &minutes_id)?;

    let topic_id = minutes.upsert_topic(TopicDoc::new(subject.clone()), None)?;
    ws.autosync()?;

    if json {
        let topic = minutes.find_topic(&topic_id);
        println!("{}", serde_json::to_string_pretty(&topic)?);
    } else {
        println!("Added topic {} - {}", short(&topic_id), subject);
    }
    Ok(())
}

pub fn handle_topic_edit(
    minutes_id: String,
    topic_id: String,
    subject: Option<String>,
    close: bool,
    reopen: bool,
) -> Result<()> {
    let ws = Workspace::open()?;
    let mut minutes = Minutes::load(ws.context(), &minutes_id)?;

    let existing = minutes
        .find_topic(&topic_id)
        .ok_or_else(|| PlenumError::TopicNotFound(topic_id.clone()))?;

    let mut doc = TopicDoc::from_topic(existing);
    if let Some(subject) = subject {
        doc.subject = subject;
    }
    if close {
        doc.is_open = false;
    }
    if reopen {
        doc.is_open = true;
    }

    minutes.upsert_topic(doc, None)?;
    ws.autosync()?;

    println!("Updated topic {}", short(&topic_id));
    Ok(())
}

pub fn handle_topic_remove(minutes_id: String, topic_id: String, force: bool) -> Result<()> {
    let ws = Workspace::open()?;
    let mut minutes = Minutes::load(ws.context(), &minutes_id)?;

    let topic = minutes
        .find_topic(&topic_id)
        .cloned()
        .ok_or_else(|| PlenumError::TopicNotFound(topic_id.clone()))?;

    // Confirm removal unless --force is used
    if !force {
        eprintln!("Remove topic {} - {}? [y/N] ", short(&topic.id), topic.subject);

        if atty::is(atty::Stream::Stdin) {
            let mut input = String::new();
            io::stdin().lock().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Cancelled.");
                return Ok(());
            }
        } else {
            return Err(PlenumError::InvalidArgument(
                "Use --force to remove in non-interactive mode".to_string(),
            ));
        }
    }

    minutes.remove_topic(&topic_id, None)?;
    ws.autosync()?;

    println!("Removed topic {} - {}", short(&topic.id), topic.subject);
    Ok(())
}

pub fn handle_topic_list(minutes_id: String, new: bool, closed: bool, json: bool) -> Result<()> {
    let ws = Workspace::open()?;
    let minutes = Minutes::load(ws.context(), &minutes_id)?;

    let topics: Vec<Topic> = if new {
        minutes.get_new_topics().into_iter().cloned().collect()
    } else if closed {
        minutes.get_old_closed_topics().into_iter().cloned().collect()
    } else {
        minutes.record().topics.clone()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&topics)?);
        return Ok(());
    }

    if topics.is_empty() {
        println!("No topics found");
        return Ok(());
    }

    for topic in &topics {
        println!("{}", format_topic(topic));
    }
    Ok(())
}

pub fn handle_outbox(json: bool) -> Result<()> {
    let ws = Workspace::open()?;
    let pending = ws.outbox.pending()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&pending)?);
        return Ok(());
    }

    if pending.is_empty() {
        println!("Outbox is empty");
        return Ok(());
    }

    for call in &pending {
        println!(
            "{:>4} {} (queued {})",
            call.id,
            call.method,
            call.enqueued_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

pub fn handle_sync() -> Result<()> {
    let ws = Workspace::open()?;
    let applied = sync::apply_pending(&ws.outbox, &ws.cache)?;

    if applied.is_empty() {
        println!("Nothing to apply");
        return Ok(());
    }

    for a in &applied {
        println!("  {} {}", a.method, short(&a.id));
    }
    println!("Applied {} call(s)", applied.len());
    Ok(())
}
