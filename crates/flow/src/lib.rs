pub mod calendar;
pub mod query;
pub mod result_set;
pub mod source;
pub mod store;
pub mod ticket;
pub mod timeline;

pub use calendar::business_days_between;
pub use result_set::{ProjectResultSet, QueryResultSet, DEFAULT_QUERY_LABEL};
pub use source::{ChangeEvent, ProjectMetadata, RawTicket, TicketSource};
pub use store::{MetricsStore, StoreLimits};
pub use ticket::TicketRecord;
pub use timeline::{FlowEntry, FlowTimeline, RawFlowEntry, TimelineBuilder, CREATED_STATE};
