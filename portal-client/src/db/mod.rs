pub mod statistics_queries;
