mod window;
pub mod postgres;

pub use self::in_memory_test::{
    InMemoryConnection, InMemoryResponse, InMemoryResult, InMemoryStatement,
    InMemoryTestResponseBuilder, RecordedQuery,
};
pub use self::postgres::{PgConnection, PgResult, PgStatement};
