use crate::{Context, OsEnv, Result};
use ocisign_file_read_tokio::TokioFileRead;
use ocisign_http_send_reqwest::{HttpOptions, ReqwestHttpSend};

/// Create a context with the default implementations.
///
/// - Files are read with [`TokioFileRead`]
/// - HTTP requests go through [`ReqwestHttpSend`], trusting the platform roots
/// - Environment comes from [`OsEnv`]
pub fn default_context() -> Context {
    Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv)
}

/// Create a default context whose HTTP client is built from `opts`.
///
/// Fails with `ConfigInvalid` if the configured CA bundle can't be loaded.
pub fn http_context(opts: HttpOptions) -> Result<Context> {
    Ok(Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::from_options(opts)?)
        .with_env(OsEnv))
}
