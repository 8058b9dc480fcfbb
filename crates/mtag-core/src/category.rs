//! Category lookup and creation from a typed name.

use std::error::Error;

use crate::entry::Category;
use crate::types::{CategoryId, CategoryName};

/// A main category together with its subcategories.
pub type CategoryGroup = (Category, Vec<Category>);

/// Boxed error returned by repository implementations.
pub type RepositoryError = Box<dyn Error + Send + Sync>;

/// Storage of categories as seen by the timeline.
///
/// Implemented by the SQLite store and by in-memory fixtures in tests.
pub trait CategoryRepository {
    /// All main categories with their subcategories.
    fn all_categories(&self) -> Result<Vec<CategoryGroup>, RepositoryError>;

    /// Stores a new category and returns its ID.
    fn insert_category(
        &self,
        name: &str,
        parent: Option<CategoryId>,
    ) -> Result<CategoryId, RepositoryError>;
}

/// Asks the user which category a freshly drawn entry belongs to.
pub trait CategoryPrompt {
    /// Returns the typed category name, or `None` if the user cancelled.
    fn choose(&mut self, categories: &[CategoryGroup]) -> Option<String>;
}

/// Finds the first category whose name matches `name` ignoring case.
///
/// Main categories are searched before their subcategories, in list order.
/// Duplicate names are not an error: the first match wins.
pub fn find_by_name<'a>(categories: &'a [CategoryGroup], name: &CategoryName) -> Option<&'a Category> {
    categories
        .iter()
        .flat_map(|(main, subs)| std::iter::once(main).chain(subs.iter()))
        .find(|category| name.matches(&category.name))
}

/// Resolves a typed name to an existing category, inserting a new main
/// category when nothing matches.
pub fn resolve<R: CategoryRepository + ?Sized>(
    repository: &R,
    categories: &[CategoryGroup],
    name: &CategoryName,
) -> Result<Category, RepositoryError> {
    if let Some(existing) = find_by_name(categories, name) {
        return Ok(existing.clone());
    }

    let id = repository.insert_category(name.as_str(), None)?;
    tracing::info!(category = %name, %id, "created category");
    Ok(Category {
        id: Some(id),
        ..Category::new(name.as_str())
    })
}
