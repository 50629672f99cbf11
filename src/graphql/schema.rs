use async_graphql::{
    Context, EmptyMutation, EmptySubscription, ErrorExtensions, Object, Result,
    Schema as GraphQLSchema,
};

use crate::{
    app_state::AppState,
    models::dto::{
        request::ThreadListQuery,
        response::{CourseSummaryDto, ProfileDto, ThreadPageDto},
    },
};

pub type Schema = GraphQLSchema<QueryRoot, EmptyMutation, EmptySubscription>;

/// Read-only view over profiles, courses and forum threads.
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn profile(&self, ctx: &Context<'_>, user_id: String) -> Result<ProfileDto> {
        let state = ctx.data::<AppState>()?;
        state
            .user_service
            .get_profile(&user_id)
            .await
            .map_err(|e| e.extend())
    }

    async fn courses(&self, ctx: &Context<'_>) -> Result<Vec<CourseSummaryDto>> {
        let state = ctx.data::<AppState>()?;
        state
            .course_service
            .list_courses()
            .await
            .map_err(|e| e.extend())
    }

    async fn threads(
        &self,
        ctx: &Context<'_>,
        category: Option<String>,
        search: Option<String>,
        page: Option<u64>,
        page_size: Option<u64>,
    ) -> Result<ThreadPageDto> {
        let state = ctx.data::<AppState>()?;
        let query = ThreadListQuery {
            category,
            search,
            page,
            page_size,
        };
        state
            .forum_service
            .list_threads(query.into())
            .await
            .map_err(|e| e.extend())
    }
}

pub fn create_schema(app_state: AppState) -> Schema {
    GraphQLSchema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(app_state)
        .finish()
}
