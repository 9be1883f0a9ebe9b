use async_trait::async_trait;
use sqlx::SqlitePool;

use showcase::db::{self, FeedQuery, Pool};
use showcase::feed::{FeedController, FeedRequest, FeedStatus, FeedTransport, FetchOutcome};
use showcase::model::{NewProject, NewUser, Project};
use showcase::ShowcaseError;

async fn setup_pool() -> Pool {
    let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

async fn seed_user(pool: &Pool, name: &str) -> String {
    db::create_user(
        pool,
        &NewUser {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            avatar_url: format!("https://cdn/{name}.png"),
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_project(pool: &Pool, creator: &str, title: &str, category: &str) -> Project {
    db::create_project(
        pool,
        &NewProject {
            title: title.into(),
            description: Some(format!("{title} description")),
            image: format!("https://cdn/{title}.png"),
            live_site_url: "https://live.dev".into(),
            github_url: None,
            category: category.into(),
            creator_id: creator.into(),
        },
    )
    .await
    .unwrap()
}

/// Serves feed requests straight from the pool, as the GraphQL resolver does.
struct PoolTransport(Pool);

#[async_trait]
impl FeedTransport for PoolTransport {
    async fn fetch_projects(&self, request: &FeedRequest) -> Result<Vec<Project>, ShowcaseError> {
        let feed = FeedQuery::from_request(
            request.category.as_deref(),
            request.first,
            request.after.as_deref(),
        )?;
        db::fetch_projects_page(&self.0, &feed).await
    }
}

fn ids(projects: &[Project]) -> Vec<&str> {
    projects.iter().map(|p| p.id.as_str()).collect()
}

#[tokio::test]
async fn pages_continue_toward_older_projects() {
    let pool = setup_pool().await;
    let ada = seed_user(&pool, "Ada").await;
    for n in 1..=5 {
        seed_project(&pool, &ada, &format!("Mobile {n}"), "Mobile").await;
    }
    seed_project(&pool, &ada, "Web thing", "Front-end").await;

    let first = FeedQuery::from_request(Some("Mobile"), 3, None).unwrap();
    let page = db::fetch_projects_page(&pool, &first).await.unwrap();
    assert_eq!(ids(&page), ["5", "4", "3"]);
    assert!(page.iter().all(|p| p.category == "Mobile"));

    let next = FeedQuery::from_request(Some("Mobile"), 3, Some("3")).unwrap();
    let page = db::fetch_projects_page(&pool, &next).await.unwrap();
    assert_eq!(ids(&page), ["2", "1"]);

    let unfiltered = FeedQuery::from_request(None, 10, None).unwrap();
    let page = db::fetch_projects_page(&pool, &unfiltered).await.unwrap();
    assert_eq!(page.len(), 6);
    assert_eq!(page[0].title, "Web thing");
}

#[tokio::test]
async fn page_never_exceeds_requested_size() {
    let pool = setup_pool().await;
    let ada = seed_user(&pool, "Ada").await;
    for n in 0..12 {
        seed_project(&pool, &ada, &format!("Project {n}"), "Game Dev").await;
    }
    let feed = FeedQuery::from_request(None, 9, None).unwrap();
    assert_eq!(db::fetch_projects_page(&pool, &feed).await.unwrap().len(), 9);
}

#[tokio::test]
async fn orphaned_project_gets_placeholder_owner() {
    let pool = setup_pool().await;
    let ada = seed_user(&pool, "Ada").await;
    let project = seed_project(&pool, &ada, "Orphan", "UI/UX").await;
    assert_eq!(project.created_by.name, "Ada");

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(ada.parse::<i64>().unwrap())
        .execute(&pool)
        .await
        .unwrap();

    let feed = FeedQuery::from_request(Some("UI/UX"), 9, None).unwrap();
    let page = db::fetch_projects_page(&pool, &feed).await.unwrap();
    assert_eq!(page.len(), 1);
    let owner = &page[0].created_by;
    assert_eq!(owner.id, "");
    assert_eq!(owner.name, "");
    assert_eq!(owner.email, "");
    assert_eq!(owner.avatar_url, showcase::db::mapper::DEFAULT_AVATAR_URL);
}

#[tokio::test]
async fn invalid_requests_are_validation_errors() {
    let pool = setup_pool().await;
    let transport = PoolTransport(pool);
    for request in [
        FeedRequest {
            category: None,
            first: 0,
            after: None,
        },
        FeedRequest {
            category: None,
            first: 3,
            after: Some("abc".into()),
        },
    ] {
        assert!(matches!(
            transport.fetch_projects(&request).await,
            Err(ShowcaseError::Validation(_))
        ));
    }
}

#[tokio::test]
async fn controller_walks_feed_to_exhaustion() {
    let pool = setup_pool().await;
    let ada = seed_user(&pool, "Ada").await;
    for n in 1..=7 {
        seed_project(&pool, &ada, &format!("Mobile {n}"), "Mobile").await;
    }
    seed_project(&pool, &ada, "Backend", "Back-end").await;

    let transport = PoolTransport(pool.clone());
    let mut feed = FeedController::new(3);
    let mut pending = Some(feed.select_category(Some("Mobile")));
    let mut fetches = 0;
    while let Some(fetch) = pending.take() {
        fetches += 1;
        assert!(matches!(
            feed.run(&transport, fetch).await,
            FetchOutcome::Applied { .. }
        ));
        pending = feed.load_more();
    }

    assert_eq!(fetches, 3);
    assert_eq!(feed.status(), FeedStatus::LoadedExhausted);
    assert_eq!(ids(feed.projects()), ["7", "6", "5", "4", "3", "2", "1"]);
    assert_eq!(feed.cursor(), Some("1"));
}

#[tokio::test]
async fn controller_absorbs_shifted_window() {
    let pool = setup_pool().await;
    let ada = seed_user(&pool, "Ada").await;
    for n in 1..=4 {
        seed_project(&pool, &ada, &format!("Project {n}"), "Full Stack").await;
    }
    let transport = PoolTransport(pool.clone());
    let mut feed = FeedController::new(2);
    let pending = feed.mount();
    feed.run(&transport, pending).await;
    assert_eq!(ids(feed.projects()), ["4", "3"]);

    // Deliver an overlapping page by hand, as a server with a shifted
    // window would.
    let pending = feed.load_more().unwrap();
    let overlap = db::fetch_projects_page(
        &pool,
        &FeedQuery::from_request(None, 2, Some("4")).unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(ids(&overlap), ["3", "2"]);
    assert_eq!(
        feed.complete(pending, Ok(overlap)),
        FetchOutcome::Applied { appended: 1 }
    );
    assert_eq!(ids(feed.projects()), ["4", "3", "2"]);
    assert_eq!(feed.cursor(), Some("2"));

    let pending = feed.load_more().unwrap();
    feed.run(&transport, pending).await;
    assert_eq!(ids(feed.projects()), ["4", "3", "2", "1"]);
    assert_eq!(feed.status(), FeedStatus::LoadedExhausted);
}
