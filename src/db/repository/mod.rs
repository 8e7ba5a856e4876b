pub mod day_log;
pub mod last_used_issues;
pub mod settings;
pub mod ticket_memory;

pub use day_log::DayLogRepository;
pub use last_used_issues::LastUsedIssueRepository;
pub use settings::SettingsRepository;
pub use ticket_memory::TicketMemoryRepository;
