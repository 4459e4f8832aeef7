// Copyright 2025 The secquest Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use secquest_core::error::Fallible;
use secquest_core::error::fail;
use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio::time::sleep;

// max-age is one week in seconds.
pub const CACHE_CONTROL_IMMUTABLE: &str = "public, max-age=604800, immutable";

/// How long to wait for the server to accept connections.
const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Poll until something accepts connections on `host:port`.
pub async fn wait_for_server(host: &str, port: u16) -> Fallible<()> {
    let deadline = Instant::now() + STARTUP_TIMEOUT;
    loop {
        if TcpStream::connect(format!("{host}:{port}")).await.is_ok() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return fail(format!("nothing listening on {host}:{port}"));
        }
        sleep(Duration::from_millis(5)).await;
    }
}

/// A seed for the game's RNG.
pub fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;

    #[tokio::test]
    async fn test_wait_for_listening_server() -> Fallible<()> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        wait_for_server("127.0.0.1", port).await
    }

    #[test]
    fn test_clock_seed_varies() {
        let a = clock_seed();
        std::thread::sleep(Duration::from_millis(1));
        assert_ne!(a, clock_seed());
    }
}
