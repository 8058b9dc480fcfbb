//! Category management commands.

use std::io::Write;

use anyhow::{Context, Result, bail};
use mtag_core::{Category, CategoryName, color};
use mtag_db::Database;

use crate::CategoriesAction;

pub fn run<W: Write>(writer: &mut W, db: &Database, action: &CategoriesAction) -> Result<()> {
    match action {
        CategoriesAction::List => list(writer, db),
        CategoriesAction::Add { name, parent } => add(writer, db, name, parent.as_deref()),
        CategoriesAction::SetUrl { name, url } => {
            let mut category = find(db, name)?;
            let url = url.trim();
            category.url = (!url.is_empty()).then(|| url.to_string());
            db.update_category(&category)?;
            writeln!(writer, "Set URL of {}", category.name)?;
            Ok(())
        }
        CategoriesAction::SetColor { name, color: value } => {
            let value = value.trim().to_lowercase();
            if color::parse_rgb(&value).is_none() {
                bail!("invalid color: {value}. Use #rrggbb");
            }
            let mut category = find(db, name)?;
            category.color = Some(value);
            db.update_category(&category)?;
            writeln!(writer, "Set color of {}", category.name)?;
            Ok(())
        }
        CategoriesAction::Rename { name, new_name } => {
            let new_name = CategoryName::new(new_name.as_str())?;
            let mut category = find(db, name)?;
            let old_name = std::mem::replace(&mut category.name, new_name.to_string());
            db.update_category(&category)?;
            writeln!(writer, "Renamed {old_name} to {new_name}")?;
            Ok(())
        }
        CategoriesAction::Remove { name } => {
            let category = find(db, name)?;
            let id = category.id.context("stored category has no id")?;
            db.delete_category(id)?;
            tracing::info!(%id, name = %category.name, "category removed");
            writeln!(writer, "Removed category {}", category.name)?;
            Ok(())
        }
    }
}

fn list<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let groups = db.all_categories()?;
    if groups.is_empty() {
        writeln!(writer, "No categories.")?;
        return Ok(());
    }

    for (main, subs) in &groups {
        writeln!(writer, "{}", describe(main))?;
        for sub in subs {
            writeln!(writer, "  {}", describe(sub))?;
        }
    }
    Ok(())
}

fn describe(category: &Category) -> String {
    let mut line = format!("{}  {}", category.name, category.display_color());
    if let Some(url) = &category.url {
        line.push_str("  ");
        line.push_str(url);
    }
    line
}

fn add<W: Write>(writer: &mut W, db: &Database, name: &str, parent: Option<&str>) -> Result<()> {
    let name = CategoryName::new(name)?;
    if db.find_category(&name)?.is_some() {
        bail!("category already exists: {name}");
    }

    let parent = match parent {
        Some(parent) => {
            let parent = find(db, parent)?;
            if !parent.is_main() {
                bail!("{} is a subcategory and cannot have subcategories", parent.name);
            }
            parent.id
        }
        None => None,
    };

    db.insert_category(name.as_str(), parent)?;
    writeln!(writer, "Added category {name}")?;
    Ok(())
}

fn find(db: &Database, name: &str) -> Result<Category> {
    let name = CategoryName::new(name)?;
    db.find_category(&name)?
        .with_context(|| format!("category not found: {name}"))
}
