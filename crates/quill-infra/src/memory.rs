//! In-memory store - used when no database is configured.
//!
//! One lock guards users, posts and comments together so that cascading
//! deletes and foreign-key checks see a consistent view.
//! Note: Data is lost on process restart.

use std::cmp::Ordering as CmpOrdering;
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Comment, Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, CommentRepository, PostRepository, UserRepository};
use quill_core::query::{CommentQuery, Ordering, Page, PageRequest, PostQuery, SortField};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
}

/// In-memory implementation of every repository port.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Row accessors shared by posts and comments for ordering.
trait Sortable {
    fn id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
}

impl Sortable for Post {
    fn id(&self) -> Uuid {
        self.id
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Sortable for Comment {
    fn id(&self) -> Uuid {
        self.id
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Sort by the requested field, ties broken by ascending id, then cut one page.
fn paginate<T: Sortable>(mut rows: Vec<T>, ordering: Ordering, request: PageRequest) -> Page<T> {
    rows.sort_by(|a, b| {
        let primary = match ordering.field {
            SortField::Id => a.id().cmp(&b.id()),
            SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
            SortField::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
        };
        let primary = if ordering.descending {
            primary.reverse()
        } else {
            primary
        };
        match primary {
            CmpOrdering::Equal => a.id().cmp(&b.id()),
            other => other,
        }
    });

    let total = rows.len() as u64;
    let items = rows
        .into_iter()
        .skip(request.offset() as usize)
        .take(request.page_size as usize)
        .collect();

    Page::new(items, total, request)
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(RepoError::Constraint("users.email must be unique".to_string()));
        }
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut state = self.state.write().await;
        match state.users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(user)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        if state.users.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }

        let owned_posts: HashSet<Uuid> = state
            .posts
            .values()
            .filter(|p| p.user_id == id)
            .map(|p| p.id)
            .collect();
        state.posts.retain(|post_id, _| !owned_posts.contains(post_id));
        state
            .comments
            .retain(|_, c| c.user_id != id && !owned_posts.contains(&c.post_id));

        tracing::debug!(user_id = %id, posts = owned_posts.len(), "Removed user with cascade");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %User::masked_email(email), "Finding user by email");

        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn mark_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        let user = state.users.get_mut(&id).ok_or(RepoError::NotFound)?;
        user.last_login = Some(at);
        Ok(())
    }

    async fn update_names(
        &self,
        id: Uuid,
        first_name: Option<String>,
        last_name: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<User, RepoError> {
        let mut state = self.state.write().await;
        let user = state.users.get_mut(&id).ok_or(RepoError::NotFound)?;
        if let Some(first_name) = first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = last_name {
            user.last_name = last_name;
        }
        user.updated_at = at;
        Ok(user.clone())
    }

    async fn set_password_hash(
        &self,
        id: Uuid,
        password_hash: String,
        at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        let user = state.users.get_mut(&id).ok_or(RepoError::NotFound)?;
        user.password_hash = password_hash;
        user.updated_at = at;
        Ok(())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.state.read().await.posts.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&post.user_id) {
            return Err(RepoError::Constraint("posts.user_id references a missing user".to_string()));
        }
        state.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut state = self.state.write().await;
        match state.posts.get_mut(&post.id) {
            Some(existing) => {
                *existing = post.clone();
                Ok(post)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        if state.posts.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        state.comments.retain(|_, c| c.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn list(&self, query: &PostQuery) -> Result<Page<Post>, RepoError> {
        let state = self.state.read().await;
        let rows: Vec<Post> = state
            .posts
            .values()
            .filter(|p| p.user_id == query.owner_id)
            .filter(|p| query.is_published.is_none_or(|flag| p.is_published == flag))
            .filter(|p| query.title.as_deref().is_none_or(|title| p.title == title))
            .cloned()
            .collect();

        Ok(paginate(rows, query.ordering, query.page))
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.state.read().await.comments.get(&id).cloned())
    }

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint("comments.post_id references a missing post".to_string()));
        }
        if !state.users.contains_key(&comment.user_id) {
            return Err(RepoError::Constraint("comments.user_id references a missing user".to_string()));
        }
        state.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut state = self.state.write().await;
        match state.comments.get_mut(&comment.id) {
            Some(existing) => {
                *existing = comment.clone();
                Ok(comment)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        state
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn list(&self, query: &CommentQuery) -> Result<Page<Comment>, RepoError> {
        let state = self.state.read().await;
        let rows: Vec<Comment> = state
            .comments
            .values()
            .filter(|c| c.post_id == query.post_id)
            .filter(|c| query.user_id.is_none_or(|user_id| c.user_id == user_id))
            .cloned()
            .collect();

        Ok(paginate(rows, query.ordering, query.page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn user(email: &str) -> User {
        User::new(email.to_string(), "hash".to_string(), String::new(), String::new())
    }

    async fn seeded() -> (InMemoryStore, User) {
        let store = InMemoryStore::new();
        let users: &dyn UserRepository = &store;
        let alice = users.insert(user("alice@example.com")).await.unwrap();
        (store, alice)
    }

    #[tokio::test]
    async fn test_duplicate_email_is_constraint_violation() {
        let (store, _) = seeded().await;
        let users: &dyn UserRepository = &store;

        let result = users.insert(user("alice@example.com")).await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_find_by_email_and_mark_login() {
        let (store, alice) = seeded().await;
        let users: &dyn UserRepository = &store;

        let now = Utc::now();
        users.mark_login(alice.id, now).await.unwrap();

        let found = users.find_by_email("alice@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, alice.id);
        assert_eq!(found.last_login, Some(now));
        assert!(users.find_by_email("bob@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_column_updates_leave_other_fields_alone() {
        let (store, alice) = seeded().await;
        let users: &dyn UserRepository = &store;

        let login_at = Utc::now();
        users.mark_login(alice.id, login_at).await.unwrap();
        users
            .set_password_hash(alice.id, "new-hash".to_string(), Utc::now())
            .await
            .unwrap();
        let renamed = users
            .update_names(alice.id, Some("Alice".to_string()), None, Utc::now())
            .await
            .unwrap();

        assert_eq!(renamed.first_name, "Alice");
        assert_eq!(renamed.last_name, "");
        assert_eq!(renamed.password_hash, "new-hash");
        assert_eq!(renamed.last_login, Some(login_at));

        let missing = users
            .set_password_hash(Uuid::new_v4(), "x".to_string(), Utc::now())
            .await;
        assert!(matches!(missing, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_post_requires_existing_owner() {
        let store = InMemoryStore::new();
        let posts: &dyn PostRepository = &store;

        let orphan = Post::new(Uuid::new_v4(), "t".into(), "c".into(), true);
        assert!(matches!(posts.insert(orphan).await, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_user_delete_cascades() {
        let (store, alice) = seeded().await;
        let users: &dyn UserRepository = &store;
        let posts: &dyn PostRepository = &store;
        let comments: &dyn CommentRepository = &store;

        let bob = users.insert(user("bob@example.com")).await.unwrap();
        let alice_post = posts
            .insert(Post::new(alice.id, "a".into(), "c".into(), true))
            .await
            .unwrap();
        let bob_post = posts
            .insert(Post::new(bob.id, "b".into(), "c".into(), true))
            .await
            .unwrap();
        let bob_on_alice = comments
            .insert(Comment::new(alice_post.id, bob.id, "hi".into()))
            .await
            .unwrap();
        let alice_on_bob = comments
            .insert(Comment::new(bob_post.id, alice.id, "yo".into()))
            .await
            .unwrap();

        users.delete(alice.id).await.unwrap();

        assert!(posts.find_by_id(alice_post.id).await.unwrap().is_none());
        assert!(comments.find_by_id(bob_on_alice.id).await.unwrap().is_none());
        assert!(comments.find_by_id(alice_on_bob.id).await.unwrap().is_none());
        assert!(posts.find_by_id(bob_post.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_post_delete_cascades_to_comments() {
        let (store, alice) = seeded().await;
        let posts: &dyn PostRepository = &store;
        let comments: &dyn CommentRepository = &store;

        let post = posts
            .insert(Post::new(alice.id, "a".into(), "c".into(), true))
            .await
            .unwrap();
        let comment = comments
            .insert(Comment::new(post.id, alice.id, "hi".into()))
            .await
            .unwrap();

        posts.delete(post.id).await.unwrap();
        assert!(comments.find_by_id(comment.id).await.unwrap().is_none());
        assert!(matches!(posts.delete(post.id).await, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_post_list_filters_orders_and_pages() {
        let (store, alice) = seeded().await;
        let users: &dyn UserRepository = &store;
        let posts: &dyn PostRepository = &store;
        let bob = users.insert(user("bob@example.com")).await.unwrap();

        let base = Utc::now();
        for i in 0..5 {
            let mut post = Post::new(alice.id, format!("post {i}"), "c".into(), i % 2 == 0);
            post.created_at = base + TimeDelta::seconds(i);
            posts.insert(post).await.unwrap();
        }
        posts
            .insert(Post::new(bob.id, "post 0".into(), "c".into(), true))
            .await
            .unwrap();

        let mut query = PostQuery::for_owner(alice.id);
        query.page = PageRequest::new(Some(1), Some(2)).unwrap();
        let page = posts.list(&query).await.unwrap();
        assert_eq!(page.total, 5);
        let titles: Vec<_> = page.items.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["post 4", "post 3"]);
        assert!(page.has_next());

        query.is_published = Some(true);
        query.ordering = Ordering::OLDEST_FIRST;
        query.page = PageRequest::default();
        let published = posts.list(&query).await.unwrap();
        let titles: Vec<_> = published.items.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["post 0", "post 2", "post 4"]);

        let mut by_title = PostQuery::for_owner(alice.id);
        by_title.title = Some("post 0".to_string());
        let found = posts.list(&by_title).await.unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.items[0].user_id, alice.id);
    }

    #[tokio::test]
    async fn test_comment_list_filters_by_user() {
        let (store, alice) = seeded().await;
        let users: &dyn UserRepository = &store;
        let posts: &dyn PostRepository = &store;
        let comments: &dyn CommentRepository = &store;
        let bob = users.insert(user("bob@example.com")).await.unwrap();

        let post = posts
            .insert(Post::new(alice.id, "a".into(), "c".into(), true))
            .await
            .unwrap();
        comments
            .insert(Comment::new(post.id, alice.id, "one".into()))
            .await
            .unwrap();
        comments
            .insert(Comment::new(post.id, bob.id, "two".into()))
            .await
            .unwrap();

        let all = comments.list(&CommentQuery::for_post(post.id)).await.unwrap();
        assert_eq!(all.total, 2);

        let mut query = CommentQuery::for_post(post.id);
        query.user_id = Some(bob.id);
        let only_bob = comments.list(&query).await.unwrap();
        assert_eq!(only_bob.total, 1);
        assert_eq!(only_bob.items[0].content, "two");
    }
}
