use instant::Duration;
use std::future::Future;

/// Run a future in the background on the current platform's executor
#[cfg(target_arch = "wasm32")]
pub(crate) fn spawn_detached<F>(fut: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(fut);
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn spawn_detached<F>(fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    #[cfg(feature = "native")]
    tokio::spawn(fut);

    #[cfg(not(feature = "native"))]
    compile_error!("Non-WASM builds require the 'native' feature to be enabled");
}

/// Platform-agnostic sleep
#[cfg(target_arch = "wasm32")]
pub(crate) async fn platform_sleep(duration: Duration) {
    gloo_timers::future::TimeoutFuture::new(duration.as_millis() as u32).await;
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) async fn platform_sleep(duration: Duration) {
    #[cfg(feature = "native")]
    tokio::time::sleep(duration).await;

    #[cfg(not(feature = "native"))]
    compile_error!("Non-WASM builds require the 'native' feature to be enabled");
}
