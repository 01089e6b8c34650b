pub mod accuracy_bar;
pub mod browse_list;
pub mod progress_sidebar;
pub mod scope_tree;
pub mod verse_area;
