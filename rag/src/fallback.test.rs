use super::*;

#[tokio::test]
async fn test_success_passes_through() {
    let value = or_degrade("test", async { Ok::<_, RagErr>(7) }, |_| 0).await;
    assert_eq!(value, 7);
}

#[tokio::test]
async fn test_failure_degrades_with_error() {
    let value = or_degrade(
        "test",
        async {
            Err::<String, _>(RagErr::RerankFailed {
                cause: "quota".to_string(),
            })
        },
        |err| format!("degraded: {err}"),
    )
    .await;
    assert_eq!(value, "degraded: Rerank failed: quota");
}
