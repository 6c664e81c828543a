mod result_delegate;
mod statement_delegate;

pub use result_delegate::ResultDelegate;
pub use statement_delegate::StatementDelegate;
