use sqlx::PgPool;
use std::time::Duration;
use tracing::{error, info};

use super::repo;

const SYNC_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

struct SourceBenefit {
    name: &'static str,
    description: &'static str,
    source_url: Option<&'static str>,
}

/// Curated source list. A public-API fetch would replace this; until then the
/// sync keeps the catalog rows fresh via find-or-update.
fn source_catalog() -> Vec<SourceBenefit> {
    vec![
        SourceBenefit {
            name: "청년내일채움공제",
            description: "중소기업에 취업한 청년을 대상으로 장기재직을 지원하는 정책",
            source_url: Some("https://www.work.go.kr"),
        },
        SourceBenefit {
            name: "중소기업 취업자 소득세 감면",
            description: "중소기업 취업 청년에게 소득세 90% 감면 혜택 제공",
            source_url: Some("https://www.nts.go.kr"),
        },
    ]
}

pub async fn sync_benefits(db: &PgPool) -> anyhow::Result<()> {
    info!("syncing SME benefits");
    for benefit in source_catalog() {
        repo::upsert_by_name(db, benefit.name, benefit.description, benefit.source_url).await?;
    }
    info!("SME benefits sync completed");
    Ok(())
}

/// Daily best-effort refresh; failures are logged only.
pub fn spawn_daily_sync(db: PgPool) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SYNC_INTERVAL);
        loop {
            ticker.tick().await;
            if let Err(e) = sync_benefits(&db).await {
                error!(error = %e, "SME benefits sync failed");
            }
        }
    })
}
