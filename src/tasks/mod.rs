pub(crate) mod deadlines;
pub(crate) mod scheduler;
