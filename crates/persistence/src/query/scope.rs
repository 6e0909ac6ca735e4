//! Composable query modifiers.

use sea_orm::{EntityTrait, Select};

/// Apply a query modifier in method-chain position.
///
/// ```ignore
/// let query = users::Entity::find()
///     .scope(full_text_filter_scope("name", "alice"))
///     .scope(paginate_scope(&mut paging));
/// ```
pub trait ScopeExt: Sized {
    fn scope<F>(self, modifier: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        modifier(self)
    }
}

impl<E: EntityTrait> ScopeExt for Select<E> {}
