pub mod threaded_pipeline_executor;
