// Infrastructure implementations of the domain seams

pub mod prediction;
pub mod runtime;
pub mod storage;
pub mod venue;
