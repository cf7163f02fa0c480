/*!
 * One instrumented, schema-validated completion call.
 */

use log::{debug, info};
use std::time::{Duration, Instant};

use crate::errors::LookupError;
use crate::providers::{CompletionRequest, Provider, TokenUsage};
use crate::validation::{self, ResponseSchema};

/// Outcome of a call plus what it cost
#[derive(Debug)]
pub struct CallReport<T> {
    pub result: Result<T, LookupError>,
    pub usage: Option<TokenUsage>,
    pub elapsed: Duration,
}

/// Send `request` and validate the reply against `T`
///
/// Latency and token usage are logged at info level for every call,
/// successful or not.
pub async fn structured_call<T: ResponseSchema>(
    provider: &dyn Provider,
    request: CompletionRequest,
    label: &str,
) -> CallReport<T> {
    let start = Instant::now();
    let outcome = provider.complete(request).await;
    let elapsed = start.elapsed();

    info!("{} call to {} finished in {:.3}s", label, provider.name(), elapsed.as_secs_f64());

    match outcome {
        Ok(completion) => {
            if let Some(usage) = &completion.usage {
                info!(
                    "Token count: Input {}, Output {}, Cached {}, Total {}",
                    usage.input_tokens, usage.output_tokens, usage.cached_tokens, usage.total_tokens
                );
            }
            debug!("{} raw reply: {}", label, completion.text);

            CallReport {
                result: validation::validate::<T>(&completion.text).map_err(LookupError::from),
                usage: completion.usage,
                elapsed,
            }
        }
        Err(error) => CallReport {
            result: Err(LookupError::from(error)),
            usage: None,
            elapsed,
        },
    }
}
