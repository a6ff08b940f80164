use clap::Subcommand;
use studytrack_core::Database;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum CategoryAction {
    /// Add a study category
    Add {
        /// Category name
        name: String,
    },
    /// Remove a category and all of its records
    Remove {
        /// Category name
        name: String,
    },
    /// List categories in creation order
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: CategoryAction) -> CmdResult {
    let db = Database::open()?;

    match action {
        CategoryAction::Add { name } => {
            let name = db.add_category(&name)?;
            println!("Category added: {name}");
        }
        CategoryAction::Remove { name } => {
            db.remove_category(&name)?;
            println!("Category removed: {name}");
        }
        CategoryAction::List { json } => {
            let names = db.list_categories()?;
            if json {
                print_json(&names)?;
            } else if names.is_empty() {
                println!("No categories yet. Add one with `studytrack category add <name>`.");
            } else {
                for name in names {
                    println!("{name}");
                }
            }
        }
    }
    Ok(())
}
