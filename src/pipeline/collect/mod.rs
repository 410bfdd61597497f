pub mod ledger;
pub mod merger;
pub mod sink;
pub mod stage;
pub mod total;

pub use ledger::CompletionLedger;
pub use merger::{MergedResult, ResultMerger, TextEntry};
pub use sink::ResultSink;
pub use stage::{CollectStage, StageState};
pub use total::SharedImageTotal;
