//! Post aggregate manager: posts, likes and comments.

use std::sync::Arc;

use domains::policy::ensure_owner;
use domains::{
    AppError, Comment, CommentId, Like, Post, PostId, PostRepository, Result, User, UserId,
    UserRepository,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::validation::Validator;

/// Body shared by post creation and comments.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TextInput {
    pub text: Option<String>,
}

impl TextInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    fn into_text(self) -> Result<String> {
        let mut v = Validator::new();
        let text = v.required("text", self.text.as_deref(), "Text is required");
        v.finish()?;
        text.ok_or_else(|| AppError::Internal("text validation passed without text".into()))
    }
}

#[derive(Clone)]
pub struct PostService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(users: Arc<dyn UserRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { users, posts }
    }

    #[instrument(skip(self, input), fields(user_id = %caller))]
    pub async fn create_post(&self, caller: UserId, input: TextInput) -> Result<Post> {
        let text = input.into_text()?;
        let author = self.author(caller).await?;
        let post = Post::new(&author, text);
        self.posts.insert(&post).await?;
        info!(post_id = %post.id, "post created");
        Ok(post)
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        Ok(self.posts.list_recent().await?)
    }

    pub async fn get_post(&self, id: PostId) -> Result<Post> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("post", id))
    }

    #[instrument(skip(self), fields(user_id = %caller))]
    pub async fn delete_post(&self, caller: UserId, id: PostId) -> Result<()> {
        let post = self.get_post(id).await?;
        if let Err(err) = ensure_owner(&post, caller, "post") {
            warn!(post_id = %id, author = %post.user, "refusing to delete post of another user");
            return Err(err);
        }
        self.posts.delete(id).await?;
        info!(post_id = %id, "post deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %caller))]
    pub async fn like_post(&self, caller: UserId, id: PostId) -> Result<Vec<Like>> {
        let mut post = self.get_post(id).await?;
        post.like(caller)?;
        let stored = self.posts.update(&post).await?;
        info!(post_id = %id, likes = stored.likes.len(), "post liked");
        Ok(stored.likes)
    }

    #[instrument(skip(self), fields(user_id = %caller))]
    pub async fn unlike_post(&self, caller: UserId, id: PostId) -> Result<Vec<Like>> {
        let mut post = self.get_post(id).await?;
        post.unlike(caller)?;
        let stored = self.posts.update(&post).await?;
        info!(post_id = %id, likes = stored.likes.len(), "post unliked");
        Ok(stored.likes)
    }

    #[instrument(skip(self, input), fields(user_id = %caller))]
    pub async fn add_comment(&self, caller: UserId, id: PostId, input: TextInput) -> Result<Post> {
        let text = input.into_text()?;
        let mut post = self.get_post(id).await?;
        let author = self.author(caller).await?;
        let comment = Comment::new(&author, text);
        let comment_id = comment.id;
        post.add_comment(comment);
        let stored = self.posts.update(&post).await?;
        info!(post_id = %id, %comment_id, "comment added");
        Ok(stored)
    }

    #[instrument(skip(self), fields(user_id = %caller))]
    pub async fn delete_comment(&self, caller: UserId, id: PostId, comment_id: CommentId) -> Result<Post> {
        let mut post = self.get_post(id).await?;
        if let Err(err) = post.remove_comment(caller, comment_id) {
            warn!(post_id = %id, %comment_id, error = %err, "comment not removed");
            return Err(err);
        }
        let stored = self.posts.update(&post).await?;
        info!(post_id = %id, %comment_id, "comment deleted");
        Ok(stored)
    }

    async fn author(&self, id: UserId) -> Result<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("user", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use domains::{MockPostRepository, MockUserRepository};
    use mockall::predicate::eq;

    fn user(name: &str) -> User {
        User {
            id: UserId::new(),
            name: name.into(),
            email: format!("{name}@example.com"),
            password_hash: String::new(),
            avatar: format!("//avatar/{name}"),
            created_at: Utc::now(),
        }
    }

    fn users_with(list: Vec<User>) -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |id| Ok(list.iter().find(|u| u.id == id).cloned()));
        users
    }

    fn posts_holding(post: Post) -> MockPostRepository {
        let mut posts = MockPostRepository::new();
        let id = post.id;
        posts
            .expect_find_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(post.clone())));
        posts.expect_update().returning(|p| {
            let mut stored = p.clone();
            stored.version += 1;
            Ok(stored)
        });
        posts
    }

    fn service(users: MockUserRepository, posts: MockPostRepository) -> PostService {
        PostService::new(Arc::new(users), Arc::new(posts))
    }

    #[tokio::test]
    async fn create_post_snapshots_author_fields() {
        let ada = user("ada");
        let mut posts = MockPostRepository::new();
        posts.expect_insert().times(1).returning(|_| Ok(()));

        let post = service(users_with(vec![ada.clone()]), posts)
            .create_post(ada.id, TextInput::new("hi"))
            .await
            .unwrap();
        assert_eq!(post.text, "hi");
        assert_eq!(post.name, "ada");
        assert_eq!(post.avatar, ada.avatar);
        assert!(post.likes.is_empty());
        assert!(post.comments.is_empty());
    }

    #[tokio::test]
    async fn blank_text_is_rejected() {
        let err = service(MockUserRepository::new(), MockPostRepository::new())
            .create_post(UserId::new(), TextInput::new("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn list_posts_passes_through_store_order() {
        let ada = user("ada");
        let mut older = Post::new(&ada, "old".into());
        older.date = Utc::now() - Duration::hours(1);
        let newer = Post::new(&ada, "new".into());
        let mut posts = MockPostRepository::new();
        let listed = vec![newer.clone(), older.clone()];
        posts.expect_list_recent().returning(move || Ok(listed.clone()));

        let all = service(MockUserRepository::new(), posts).list_posts().await.unwrap();
        assert_eq!(all[0].id, newer.id);
        assert_eq!(all[1].id, older.id);
    }

    #[tokio::test]
    async fn only_author_may_delete_post() {
        let ada = user("ada");
        let bob = user("bob");
        let post = Post::new(&ada, "hi".into());
        let id = post.id;

        let mut posts = posts_holding(post.clone());
        posts.expect_delete().never();
        let err = service(MockUserRepository::new(), posts)
            .delete_post(bob.id, id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let mut posts = posts_holding(post);
        posts.expect_delete().with(eq(id)).times(1).returning(|_| Ok(true));
        service(MockUserRepository::new(), posts)
            .delete_post(ada.id, id)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let mut posts = MockPostRepository::new();
        posts.expect_find_by_id().returning(|_| Ok(None));
        let err = service(MockUserRepository::new(), posts)
            .like_post(UserId::new(), PostId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(..)));
    }

    #[tokio::test]
    async fn second_like_conflicts_without_writing() {
        let ada = user("ada");
        let mut post = Post::new(&ada, "hi".into());
        post.like(ada.id).unwrap();
        let id = post.id;

        let mut posts = MockPostRepository::new();
        posts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(post.clone())));
        posts.expect_update().never();

        let err = service(MockUserRepository::new(), posts)
            .like_post(ada.id, id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn like_returns_updated_likes_newest_first() {
        let ada = user("ada");
        let bob = user("bob");
        let mut post = Post::new(&ada, "hi".into());
        post.like(ada.id).unwrap();
        let id = post.id;

        let likes = service(MockUserRepository::new(), posts_holding(post))
            .like_post(bob.id, id)
            .await
            .unwrap();
        assert_eq!(likes, vec![Like { user: bob.id }, Like { user: ada.id }]);
    }

    #[tokio::test]
    async fn unlike_without_like_conflicts() {
        let ada = user("ada");
        let post = Post::new(&ada, "hi".into());
        let id = post.id;
        let mut posts = MockPostRepository::new();
        posts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(post.clone())));
        posts.expect_update().never();

        let err = service(MockUserRepository::new(), posts)
            .unlike_post(ada.id, id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn comments_are_head_inserted_with_commenter_snapshot() {
        let ada = user("ada");
        let bob = user("bob");
        let mut post = Post::new(&ada, "hi".into());
        post.add_comment(Comment::new(&ada, "first".into()));
        let id = post.id;

        let updated = service(users_with(vec![bob.clone()]), posts_holding(post))
            .add_comment(bob.id, id, TextInput::new("second"))
            .await
            .unwrap();
        assert_eq!(updated.comments.len(), 2);
        assert_eq!(updated.comments[0].text, "second");
        assert_eq!(updated.comments[0].name, "bob");
        assert_eq!(updated.comments[0].user, bob.id);
    }

    #[tokio::test]
    async fn post_author_cannot_delete_someone_elses_comment() {
        let ada = user("ada");
        let bob = user("bob");
        let mut post = Post::new(&ada, "hi".into());
        let comment = Comment::new(&bob, "mine".into());
        post.add_comment(comment.clone());
        let id = post.id;

        let mut posts = MockPostRepository::new();
        posts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(post.clone())));
        posts.expect_update().never();

        let err = service(MockUserRepository::new(), posts)
            .delete_comment(ada.id, id, comment.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn comment_author_removes_exactly_one_entry() {
        let ada = user("ada");
        let bob = user("bob");
        let mut post = Post::new(&ada, "hi".into());
        let oldest = Comment::new(&ada, "1".into());
        let target = Comment::new(&bob, "2".into());
        let newest = Comment::new(&ada, "3".into());
        post.add_comment(oldest.clone());
        post.add_comment(target.clone());
        post.add_comment(newest.clone());
        let id = post.id;

        let updated = service(MockUserRepository::new(), posts_holding(post))
            .delete_comment(bob.id, id, target.id)
            .await
            .unwrap();
        let ids: Vec<_> = updated.comments.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![newest.id, oldest.id]);
    }

    #[tokio::test]
    async fn unknown_comment_is_not_found() {
        let ada = user("ada");
        let post = Post::new(&ada, "hi".into());
        let id = post.id;
        let err = service(MockUserRepository::new(), posts_holding(post))
            .delete_comment(ada.id, id, CommentId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(..)));
    }
}
