//! # Lazy Resource Example
//!
//! Many tasks ask for the same connection pool at once; the pool is built once.
//! The first build attempt fails and the next caller retries.
//!
//! ## Run
//! ```bash
//! cargo run --example lazy
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use patternkit::{AsyncLazyResource, LazyResource, Memoized};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() {
    let attempts = Arc::new(AtomicU32::new(0));
    let a = Arc::clone(&attempts);
    let pool = Arc::new(AsyncLazyResource::new(move |ctx: CancellationToken| {
        let a = Arc::clone(&a);
        async move {
            let attempt = a.fetch_add(1, Ordering::SeqCst) + 1;
            println!("[pool] build attempt #{attempt}");
            tokio::time::sleep(Duration::from_millis(50)).await;
            if ctx.is_cancelled() || attempt == 1 {
                return Err(format!("attempt #{attempt}: connection refused"));
            }
            Ok(vec!["conn-a", "conn-b", "conn-c"])
        }
    }));

    if let Err(e) = pool.get().await {
        println!("[main] first get failed: {e} (state={})", pool.state().as_label());
    }

    let mut joins = Vec::new();
    for worker in 0..8 {
        let pool = Arc::clone(&pool);
        joins.push(tokio::spawn(async move {
            match pool.get().await {
                Ok(conns) => println!("[worker {worker}] got {} connections", conns.len()),
                Err(e) => println!("[worker {worker}] error: {e}"),
            }
        }));
    }
    for j in joins {
        let _ = j.await;
    }
    println!("[main] build attempts: {}", attempts.load(Ordering::SeqCst));

    let settings = LazyResource::new(|| "8080".parse::<u16>());
    match settings.get() {
        Ok(port) => println!("[settings] port={port}"),
        Err(e) => println!("[settings] invalid port: {e}"),
    }

    let mut slug = Memoized::new(|title: &String| title.to_lowercase().replace(' ', "-"));
    for title in ["Hello World", "Hello World", "Lazy Cells"] {
        println!("[slug] {title} -> {}", slug.call(title.to_string()));
    }
    println!("[slug] hits={} misses={}", slug.hits(), slug.misses());
}
