use std::{pin::Pin, sync::Arc, time::SystemTime};

use futures::{Stream, StreamExt};

#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub payload: T,
    pub received_at: SystemTime,
}

impl<T> Envelope<T> {
    pub fn now(payload: T) -> Self {
        Self {
            payload,
            received_at: SystemTime::now(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source error: {0}")]
    Source(String),
    #[error("transform error: {0}")]
    Transform(String),
    #[error("sink error: {0}")]
    Sink(String),
}

pub type EnvelopeStream<T> = Pin<Box<dyn Stream<Item = Result<Envelope<T>, PipelineError>> + Send>>;

#[async_trait::async_trait]
pub trait Source<T>: Send + Sync {
    async fn stream(&self) -> EnvelopeStream<T>;
}

#[async_trait::async_trait]
pub trait Transform<I, O>: Send + Sync {
    async fn apply(&self, input: Envelope<I>) -> Result<Envelope<O>, PipelineError>;
}

/// Consumes a pipeline's output. Item-level errors arrive in-band; a sink is
/// expected to log and skip them, and only return `Err` when it cannot finish.
#[async_trait::async_trait]
pub trait Sink<T>: Send + Sync {
    async fn run<S>(&self, input: S) -> Result<(), PipelineError>
    where
        S: Stream<Item = Result<Envelope<T>, PipelineError>> + Send + Unpin + 'static;
}

pub struct Pipeline<S, T, K> {
    pub name: &'static str,
    pub source: S,
    pub transforms: Vec<Arc<dyn Transform<T, T> + Send + Sync>>, // same-type transforms chain
    pub sink: K,
}

impl<T, S, K> Pipeline<S, T, K>
where
    T: Send + 'static,
    S: Source<T> + Send + Sync + 'static,
    K: Sink<T> + Send + Sync + 'static,
{
    pub async fn run(self) -> Result<(), PipelineError> {
        tracing::debug!(pipeline = self.name, transforms = self.transforms.len(), "running pipeline");
        let mut stream = self.source.stream().await;

        for t in self.transforms {
            stream = Box::pin(stream.then(move |item| {
                let t = t.clone();
                async move {
                    match item {
                        Ok(env) => t.apply(env).await,
                        Err(e) => Err(e),
                    }
                }
            }));
        }

        let res = self.sink.run(stream).await;
        if let Err(e) = &res {
            tracing::error!(pipeline = self.name, error = %e, "pipeline failed");
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Numbers(Vec<i64>);

    #[async_trait::async_trait]
    impl Source<i64> for Numbers {
        async fn stream(&self) -> EnvelopeStream<i64> {
            let items: Vec<_> = self.0.iter().copied().map(|n| Ok(Envelope::now(n))).collect();
            Box::pin(futures::stream::iter(items))
        }
    }

    struct RejectOdd;

    #[async_trait::async_trait]
    impl Transform<i64, i64> for RejectOdd {
        async fn apply(&self, input: Envelope<i64>) -> Result<Envelope<i64>, PipelineError> {
            if input.payload % 2 == 0 {
                Ok(input)
            } else {
                Err(PipelineError::Transform(format!("{} is odd", input.payload)))
            }
        }
    }

    #[derive(Default)]
    struct Collect {
        seen: Mutex<Vec<i64>>,
        errors: Mutex<usize>,
    }

    #[async_trait::async_trait]
    impl Sink<i64> for Arc<Collect> {
        async fn run<S>(&self, mut input: S) -> Result<(), PipelineError>
        where
            S: Stream<Item = Result<Envelope<i64>, PipelineError>> + Send + Unpin + 'static,
        {
            while let Some(item) = input.next().await {
                match item {
                    Ok(env) => self.seen.lock().unwrap().push(env.payload),
                    Err(_) => *self.errors.lock().unwrap() += 1,
                }
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn transform_errors_flow_to_sink_without_stopping_stream() {
        let sink = Arc::new(Collect::default());
        let pipeline: Pipeline<_, i64, _> = Pipeline {
            name: "test",
            source: Numbers(vec![1, 2, 3, 4]),
            transforms: vec![Arc::new(RejectOdd)],
            sink: sink.clone(),
        };

        pipeline.run().await.unwrap();

        assert_eq!(*sink.seen.lock().unwrap(), vec![2, 4]);
        assert_eq!(*sink.errors.lock().unwrap(), 2);
    }
}
