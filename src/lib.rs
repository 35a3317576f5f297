//! An ordered set of unique keys implemented with an AVL tree.
//!
//! ```
//! use avl_tree::AvlTree;
//! let mut tree = AvlTree::new();
//! tree.insert(30);
//! tree.insert(20);
//! tree.insert(10);
//! assert_eq!(tree.root(), Some(&20));
//! assert!(tree.search(&10));
//! tree.delete(&10);
//! assert!(!tree.search(&10));
//! assert_eq!(tree.in_order_traversal(), [&20, &30]);
//! ```

mod tree;
pub use tree::AvlTree;
