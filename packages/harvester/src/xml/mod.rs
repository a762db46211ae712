//! XML navigation helpers.

mod utils;

pub use utils::{
    element_children, find_child, find_ns_child, get_tag_name, get_text, ns_text, parse_document,
    standalone_xml,
};
