use std::cell::{Cell, RefCell};

use crate::collaborator::SessionStore;
use crate::error::CollaboratorError;
use crate::token::Token;

/// Session storage for a single user session.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    token: RefCell<Option<Token>>,
    writes: Cell<usize>,
}

impl InMemorySessionStore {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session that already holds `token`.
    pub fn with_token(token: Token) -> Self {
        Self {
            token: RefCell::new(Some(token)),
            writes: Cell::new(0),
        }
    }

    /// The token currently held by the session.
    pub fn stored(&self) -> Option<Token> {
        self.token.borrow().clone()
    }

    /// Number of times [`SessionStore::store`] was called.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl SessionStore for InMemorySessionStore {
    fn store(&self, token: &Token) -> Result<(), CollaboratorError> {
        *self.token.borrow_mut() = Some(token.clone());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn load(&self) -> Result<Option<Token>, CollaboratorError> {
        Ok(self.stored())
    }

    fn clear(&self) -> Result<(), CollaboratorError> {
        self.token.borrow_mut().take();
        Ok(())
    }
}
