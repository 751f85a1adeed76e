mod commands;
mod handlers;

pub use commands::{
    Cli, Commands, MinutesAction, MinutesCommand, SeriesAction, SeriesCommand, TopicAction,
    TopicCommand,
};
pub use handlers::{
    handle_init, handle_minutes_finalize, handle_minutes_list, handle_minutes_new,
    handle_minutes_show, handle_minutes_unfinalize, handle_minutes_update, handle_outbox,
    handle_series_add, handle_series_list, handle_sync, handle_topic_add, handle_topic_edit,
    handle_topic_list, handle_topic_remove,
};
