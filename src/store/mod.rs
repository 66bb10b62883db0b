//! File-backed user store.
//!
//! The whole username -> record mapping lives in memory and is rewritten to a
//! single JSON file after every mutation. Mutations run against a working
//! copy; memory is only updated once the write has succeeded.

mod error;
mod records;

use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::password::Hasher,
    clock::{Clock, SystemClock},
};

pub use error::{reject, StoreError};
pub use records::{CommunityPost, Mood, MoodEntry, Post, UserRecord, ANONYMOUS_AUTHOR};

pub type Users = BTreeMap<String, UserRecord>;

pub struct UserStore {
    path: PathBuf,
    users: Users,
    clock: Arc<dyn Clock>,
    hasher: Hasher,
}

impl UserStore {
    /// Loads the store at `path`, creating an empty one if the file is absent.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let hasher = Hasher::standard().map_err(|e| StoreError::Hashing {
            reason: e.to_string(),
        })?;
        Self::load_with(path, Arc::new(SystemClock), hasher)
    }

    pub fn load_with(
        path: impl Into<PathBuf>,
        clock: Arc<dyn Clock>,
        hasher: Hasher,
    ) -> Result<Self, StoreError> {
        let path = path.into();
        let users = match read_users(&path)? {
            Some(users) => {
                info!(path = %path.display(), users = users.len(), "user store loaded");
                users
            }
            None => {
                let users = Users::new();
                write_users(&path, &users)?;
                info!(path = %path.display(), "user store created");
                users
            }
        };
        Ok(Self {
            path,
            users,
            clock,
            hasher,
        })
    }

    /// Re-reads the file into this instance. Memory is untouched on failure.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        self.users = match read_users(&self.path)? {
            Some(users) => users,
            None => {
                let users = Users::new();
                write_users(&self.path, &users)?;
                users
            }
        };
        Ok(())
    }

    /// Writes the current mapping over the store file.
    pub fn save(&self) -> Result<(), StoreError> {
        write_users(&self.path, &self.users)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn users(&self) -> &Users {
        &self.users
    }

    pub fn get(&self, username: &str) -> Option<&UserRecord> {
        self.users.get(username)
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Hasher used by `register` and `authenticate`. Callers that must not
    /// hash while holding the store lock use it with `register_hashed`.
    pub fn hasher(&self) -> &Hasher {
        &self.hasher
    }

    /// Stored PHC hash for `username`, if registered.
    pub fn password_hash(&self, username: &str) -> Option<&str> {
        self.users.get(username).map(|r| r.password_hash.as_str())
    }

    #[instrument(skip(self, password, display_name))]
    pub fn register(
        &mut self,
        username: &str,
        password: &str,
        display_name: &str,
        anonymous: bool,
    ) -> Result<Uuid, StoreError> {
        self.check_new_username(username)?;
        if password.is_empty() {
            return Err(StoreError::invalid("password must not be empty"));
        }
        let password_hash = self
            .hasher
            .hash(password)
            .map_err(|e| StoreError::Hashing {
                reason: e.to_string(),
            })?;
        self.register_hashed(username, password_hash, display_name, anonymous)
    }

    /// `register` with the password already hashed by [`Hasher::hash`].
    #[instrument(skip(self, password_hash, display_name))]
    pub fn register_hashed(
        &mut self,
        username: &str,
        password_hash: String,
        display_name: &str,
        anonymous: bool,
    ) -> Result<Uuid, StoreError> {
        self.check_new_username(username)?;
        if password_hash.is_empty() {
            return Err(StoreError::invalid("password hash must not be empty"));
        }

        let id = Uuid::new_v4();
        let record = UserRecord {
            id,
            password_hash,
            display_name: display_name.to_string(),
            anonymous,
            mood_entries: Vec::new(),
            meditation_minutes: 0,
            joined_date: self.clock.today(),
            posts: Vec::new(),
        };

        let mut next = self.users.clone();
        next.insert(username.to_string(), record);
        self.commit(next)?;

        info!(user_id = %id, "user registered");
        Ok(id)
    }

    /// True iff `username` exists and `password` matches its stored hash.
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        let ok = self.hasher.check(password, self.password_hash(username));
        if !ok {
            debug!(username, "authentication failed");
        }
        ok
    }

    #[instrument(skip(self, notes))]
    pub fn append_mood_entry(
        &mut self,
        username: &str,
        mood: Mood,
        notes: &str,
    ) -> Result<MoodEntry, StoreError> {
        let entry = MoodEntry {
            timestamp: self.clock.now(),
            mood_value: mood,
            notes: notes.to_string(),
        };
        self.mutate(username, |record| {
            record.mood_entries.push(entry.clone());
            Ok(entry)
        })
    }

    /// Adds `minutes` to the user's total and returns the new total.
    #[instrument(skip(self))]
    pub fn add_meditation_minutes(
        &mut self,
        username: &str,
        minutes: i64,
    ) -> Result<u64, StoreError> {
        let minutes = u64::try_from(minutes)
            .map_err(|_| StoreError::invalid("minutes must be non-negative"))?;
        self.mutate(username, |record| {
            record.meditation_minutes = record
                .meditation_minutes
                .checked_add(minutes)
                .ok_or_else(|| StoreError::invalid("meditation minutes overflow"))?;
            Ok(record.meditation_minutes)
        })
    }

    #[instrument(skip(self, content))]
    pub fn append_post(&mut self, username: &str, content: &str) -> Result<Post, StoreError> {
        let post = Post {
            content: content.to_string(),
            timestamp: self.clock.now(),
        };
        self.mutate(username, |record| {
            record.posts.push(post.clone());
            Ok(post)
        })
    }

    /// Community feed across all users, newest first. Derived from the current
    /// state on every call.
    pub fn list_posts(&self) -> impl Iterator<Item = CommunityPost<'_>> + '_ {
        let mut posts: Vec<CommunityPost<'_>> = self
            .users
            .values()
            .flat_map(|record| {
                let author = record.public_name();
                record.posts.iter().map(move |post| CommunityPost {
                    author,
                    content: &post.content,
                    date: post.timestamp,
                })
            })
            .collect();
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        posts.into_iter()
    }

    fn check_new_username(&self, username: &str) -> Result<(), StoreError> {
        if username.trim().is_empty() {
            return Err(StoreError::invalid("username must not be empty"));
        }
        if username.trim() != username {
            return Err(StoreError::invalid(
                "username must not start or end with whitespace",
            ));
        }
        if self.users.contains_key(username) {
            warn!(username, "username already registered");
            return Err(StoreError::DuplicateUsername {
                username: username.to_string(),
            });
        }
        Ok(())
    }

    /// Applies `f` to a copy of the user's record and commits it.
    fn mutate<T>(
        &mut self,
        username: &str,
        f: impl FnOnce(&mut UserRecord) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut next = self.users.clone();
        let record = next
            .get_mut(username)
            .ok_or_else(|| StoreError::UnknownUser {
                username: username.to_string(),
            })?;
        let out = f(record)?;
        self.commit(next)?;
        Ok(out)
    }

    fn commit(&mut self, next: Users) -> Result<(), StoreError> {
        write_users(&self.path, &next)?;
        self.users = next;
        Ok(())
    }
}

/// `Ok(None)` when the file does not exist.
fn read_users(path: &Path) -> Result<Option<Users>, StoreError> {
    let read_err = |source: io::Error| StoreError::StorageRead {
        path: path.to_path_buf(),
        source,
    };
    match fs::read_to_string(path) {
        Ok(json) => serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| read_err(e.into())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(read_err(e)),
    }
}

/// Writes to a temp file next to `path`, fsyncs, then renames over `path`.
fn write_users(path: &Path, users: &Users) -> Result<(), StoreError> {
    let write_err = |source: io::Error| StoreError::StorageWrite {
        path: path.to_path_buf(),
        source,
    };
    let json = serde_json::to_vec_pretty(users).map_err(|e| write_err(e.into()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(&json).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    debug!(path = %path.display(), users = users.len(), "user store written");
    Ok(())
}
