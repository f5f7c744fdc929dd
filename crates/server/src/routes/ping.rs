/// Liveness probe, no auth
pub async fn ping() -> &'static str {
    "pong"
}
