//! GraphQL schema: project and user queries and mutations.
use async_graphql::{
    Context, EmptySubscription, ErrorExtensions, MergedObject, Object, Result as GraphQLResult,
    Schema,
};

use crate::auth::{self, Session};
use crate::db::{self, FeedQuery, Pool};
use crate::error::ShowcaseError;
use crate::model::{NewProject, NewUser, Project, ProjectPatch, User, UserPatch};
use crate::validate::parse_id;

#[derive(MergedObject, Default)]
pub struct QueryRoot(ProjectQuery, UserQuery);

#[derive(MergedObject, Default)]
pub struct MutationRoot(ProjectMutation, UserMutation);

pub type ShowcaseSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(pool: Pool) -> ShowcaseSchema {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .data(pool)
    .finish()
}

fn session_user(ctx: &Context<'_>) -> Result<i64, ShowcaseError> {
    auth::require_session(ctx.data_opt::<Session>())?.user_id()
}

#[derive(Default)]
pub struct ProjectQuery;

#[Object]
impl ProjectQuery {
    /// One feed page, newest first. `after` is the id of the last project
    /// already shown.
    async fn get_projects(
        &self,
        ctx: &Context<'_>,
        category: Option<String>,
        #[graphql(default = 10)] first: i32,
        after: Option<String>,
    ) -> GraphQLResult<Vec<Project>> {
        let pool = ctx.data::<Pool>()?;
        let feed = FeedQuery::from_request(category.as_deref(), i64::from(first), after.as_deref())
            .map_err(|e| e.extend())?;
        db::fetch_projects_page(pool, &feed)
            .await
            .map_err(|e| e.extend())
    }

    async fn get_project_details(
        &self,
        ctx: &Context<'_>,
        id: String,
    ) -> GraphQLResult<Option<Project>> {
        let pool = ctx.data::<Pool>()?;
        let id = parse_id(&id, "Project").map_err(|e| e.extend())?;
        db::project_by_id(pool, id).await.map_err(|e| e.extend())
    }

    async fn get_projects_by_creator(
        &self,
        ctx: &Context<'_>,
        id: String,
    ) -> GraphQLResult<Vec<Project>> {
        let pool = ctx.data::<Pool>()?;
        let id = parse_id(&id, "User").map_err(|e| e.extend())?;
        db::projects_by_creator(pool, id)
            .await
            .map_err(|e| e.extend())
    }
}

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    async fn get_user(&self, ctx: &Context<'_>, id: String) -> GraphQLResult<Option<User>> {
        let pool = ctx.data::<Pool>()?;
        let id = parse_id(&id, "User").map_err(|e| e.extend())?;
        db::user_by_id(pool, id).await.map_err(|e| e.extend())
    }

    async fn get_user_by_email(
        &self,
        ctx: &Context<'_>,
        email: String,
    ) -> GraphQLResult<Option<User>> {
        let pool = ctx.data::<Pool>()?;
        db::user_by_email(pool, &email)
            .await
            .map_err(|e| e.extend())
    }
}

#[derive(Default)]
pub struct ProjectMutation;

#[Object]
impl ProjectMutation {
    #[allow(clippy::too_many_arguments)]
    async fn create_project(
        &self,
        ctx: &Context<'_>,
        title: String,
        description: Option<String>,
        image: String,
        live_site_url: String,
        github_url: Option<String>,
        category: String,
        creator_id: String,
    ) -> GraphQLResult<Project> {
        let pool = ctx.data::<Pool>()?;
        let user_id = session_user(ctx).map_err(|e| e.extend())?;
        if parse_id(&creator_id, "Creator").map_err(|e| e.extend())? != user_id {
            return Err(ShowcaseError::Unauthorized.extend());
        }
        let input = NewProject {
            title,
            description,
            image,
            live_site_url,
            github_url,
            category,
            creator_id,
        };
        db::create_project(pool, &input)
            .await
            .map_err(|e| e.extend())
    }

    #[allow(clippy::too_many_arguments)]
    async fn update_project(
        &self,
        ctx: &Context<'_>,
        id: String,
        title: Option<String>,
        description: Option<String>,
        image: Option<String>,
        live_site_url: Option<String>,
        github_url: Option<String>,
        category: Option<String>,
    ) -> GraphQLResult<Project> {
        let pool = ctx.data::<Pool>()?;
        let user_id = session_user(ctx).map_err(|e| e.extend())?;
        let id = parse_id(&id, "Project").map_err(|e| e.extend())?;
        auth::ensure_project_owner(pool, id, user_id)
            .await
            .map_err(|e| e.extend())?;
        let patch = ProjectPatch {
            title,
            description,
            image,
            live_site_url,
            github_url,
            category,
        };
        db::update_project(pool, id, &patch)
            .await
            .map_err(|e| e.extend())
    }

    async fn delete_project(&self, ctx: &Context<'_>, id: String) -> GraphQLResult<bool> {
        let pool = ctx.data::<Pool>()?;
        let user_id = session_user(ctx).map_err(|e| e.extend())?;
        let id = parse_id(&id, "Project").map_err(|e| e.extend())?;
        auth::ensure_project_owner(pool, id, user_id)
            .await
            .map_err(|e| e.extend())?;
        db::delete_project(pool, id).await.map_err(|e| e.extend())
    }
}

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    async fn create_user(
        &self,
        ctx: &Context<'_>,
        name: String,
        email: String,
        #[graphql(default)] avatar_url: String,
    ) -> GraphQLResult<User> {
        let pool = ctx.data::<Pool>()?;
        let input = NewUser {
            name,
            email,
            avatar_url,
        };
        db::create_user(pool, &input).await.map_err(|e| e.extend())
    }

    async fn update_user(
        &self,
        ctx: &Context<'_>,
        id: String,
        name: Option<String>,
        description: Option<String>,
        github_url: Option<String>,
        linkedin_url: Option<String>,
    ) -> GraphQLResult<User> {
        let pool = ctx.data::<Pool>()?;
        let user_id = session_user(ctx).map_err(|e| e.extend())?;
        let id = parse_id(&id, "User").map_err(|e| e.extend())?;
        if id != user_id {
            return Err(ShowcaseError::Unauthorized.extend());
        }
        let patch = UserPatch {
            name,
            description,
            github_url,
            linkedin_url,
        };
        db::update_user(pool, id, &patch)
            .await
            .map_err(|e| e.extend())
    }
}
