use std::borrow::Borrow;
use std::cmp::{self, Ordering};
use std::fmt;
use std::iter::FromIterator;

use log::trace;

/// An ordered set of unique keys stored in an AVL tree.
///
/// Every node owns its children, so all structural updates are done by
/// handing a subtree down the recursion and taking back its (possibly new) root.
pub struct AvlTree<K> {
    root: Link<K>,
    num_nodes: usize,
}

struct Node<K> {
    key: K,
    left: Link<K>,
    right: Link<K>,
    height: usize,
}

type Link<K> = Option<Box<Node<K>>>;

impl<K: Ord> AvlTree<K> {
    /// Creates an empty tree.
    /// No memory is allocated until the first key is inserted.
    pub fn new() -> Self {
        Self {
            root: None,
            num_nodes: 0,
        }
    }

    /// Inserts a key into the tree.
    /// Returns `false` and leaves the tree untouched if the key is already present.
    pub fn insert(&mut self, key: K) -> bool {
        let mut inserted = false;
        self.root = insert(self.root.take(), key, &mut inserted);
        if inserted {
            self.num_nodes += 1;
        }
        inserted
    }

    /// Deletes a key from the tree.
    /// Returns whether the key was previously in the tree.
    ///
    /// The key may be any borrowed form of the tree's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut deleted = false;
        self.root = delete(self.root.take(), key, &mut deleted);
        if deleted {
            debug_assert!(self.num_nodes >= 1);
            self.num_nodes -= 1;
        }
        deleted
    }

    /// Returns true if the tree contains the key.
    pub fn search<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Returns true if the tree contains the key.
    /// Same as [`search`](AvlTree::search).
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key)
    }

    /// Returns a reference to the stored key that is equal to the given key.
    pub fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        find(&self.root, key).map(|node| &node.key)
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        let mut num_nodes = 0;
        let mut prev: Option<&K> = None;
        self.traverse_in_order(|key| {
            // Strictly ascending in-order sequence covers ordering and uniqueness
            if let Some(prev) = prev {
                assert!(*prev < *key);
            }
            prev = Some(key);
            num_nodes += 1;
        });
        assert_eq!(num_nodes, self.num_nodes);
        check_node(&self.root);
    }
}

impl<K> AvlTree<K> {
    /// Returns true if the tree contains no keys.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of keys in the tree.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the height of the tree, 0 for an empty tree and 1 for a single key.
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    /// Returns the key stored in the topmost node.
    pub fn root(&self) -> Option<&K> {
        self.root.as_ref().map(|node| &node.key)
    }

    /// Returns the smallest key in the tree.
    pub fn first(&self) -> Option<&K> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some(&node.key)
    }

    /// Returns the largest key in the tree.
    pub fn last(&self) -> Option<&K> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some(&node.key)
    }

    /// Clears the tree, deallocating all memory.
    pub fn clear(&mut self) {
        self.root = None;
        self.num_nodes = 0;
    }

    /// Returns all keys in ascending order.
    pub fn in_order_traversal(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.num_nodes);
        self.traverse_in_order(|key| keys.push(key));
        keys
    }

    /// Consumes the tree, returning all keys in ascending order.
    pub fn into_sorted_vec(mut self) -> Vec<K> {
        let mut keys = Vec::with_capacity(self.num_nodes);
        drain_in_order(self.root.take(), &mut keys);
        self.num_nodes = 0;
        keys
    }

    /// Calls `f` for every key in ascending order.
    pub fn traverse_in_order<'a, F: FnMut(&'a K)>(&'a self, mut f: F) {
        traverse_in_order(&self.root, &mut f);
    }
}

impl<K: Ord> Default for AvlTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone> Clone for AvlTree<K> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            num_nodes: self.num_nodes,
        }
    }
}

impl<K: PartialEq> PartialEq for AvlTree<K> {
    fn eq(&self, other: &Self) -> bool {
        // Shapes may differ, only the key sequence matters
        self.num_nodes == other.num_nodes
            && self.in_order_traversal() == other.in_order_traversal()
    }
}

impl<K: Eq> Eq for AvlTree<K> {}

impl<K: fmt::Debug> fmt::Debug for AvlTree<K> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_set().entries(self.in_order_traversal()).finish()
    }
}

impl<K: Ord> FromIterator<K> for AvlTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord> Extend<K> for AvlTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        iter.into_iter().for_each(move |key| {
            self.insert(key);
        });
    }
}

impl<K: Clone> Clone for Node<K> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            left: self.left.clone(),
            right: self.right.clone(),
            height: self.height,
        }
    }
}

impl<K> Node<K> {
    fn create(key: K) -> Box<Self> {
        Box::new(Node {
            key,
            left: None,
            right: None,
            height: 1,
        })
    }

    fn adjust_height(&mut self) {
        self.height = 1 + cmp::max(height(&self.left), height(&self.right));
    }
}

fn height<K>(link: &Link<K>) -> usize {
    match link {
        None => 0,
        Some(node) => node.height,
    }
}

fn balance_factor<K>(link: &Link<K>) -> isize {
    match link {
        None => 0,
        Some(node) => height(&node.left) as isize - height(&node.right) as isize,
    }
}

//     z        y
//    / \      / \
//   y   c -> a   z
//  / \          / \
// a   b        b   c
fn rotate_right<K>(mut node: Box<Node<K>>) -> Box<Node<K>> {
    debug_assert!(node.left.is_some());
    let mut left = match node.left.take() {
        Some(left) => left,
        None => return node,
    };
    trace!("rotate right, height {}", node.height);
    node.left = left.right.take();
    node.adjust_height();
    left.right = Some(node);
    left.adjust_height();
    left
}

//   z            y
//  / \          / \
// a   y   ->   z   c
//    / \      / \
//   b   c    a   b
fn rotate_left<K>(mut node: Box<Node<K>>) -> Box<Node<K>> {
    debug_assert!(node.right.is_some());
    let mut right = match node.right.take() {
        Some(right) => right,
        None => return node,
    };
    trace!("rotate left, height {}", node.height);
    node.right = right.left.take();
    node.adjust_height();
    right.left = Some(node);
    right.adjust_height();
    right
}

/// Restores the AVL condition at the given node, whose subtrees must already be
/// balanced and whose height must already be adjusted.
/// Initial balance must not exceed +2 or -2, which always holds after a single update.
/// Returns the new root of the subtree.
fn rebalance<K>(mut node: Box<Node<K>>) -> Box<Node<K>> {
    let factor = height(&node.left) as isize - height(&node.right) as isize;
    debug_assert!((-2..=2).contains(&factor));
    if factor > 1 {
        if balance_factor(&node.left) < 0 {
            // Left-right case
            node.left = node.left.take().map(rotate_left);
        }
        rotate_right(node)
    } else if factor < -1 {
        if balance_factor(&node.right) > 0 {
            // Right-left case
            node.right = node.right.take().map(rotate_right);
        }
        rotate_left(node)
    } else {
        node
    }
}

fn find<'a, K, Q>(link: &'a Link<K>, key: &Q) -> Option<&'a Node<K>>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut current = link.as_deref();
    while let Some(node) = current {
        current = match key.cmp(node.key.borrow()) {
            Ordering::Equal => return Some(node),
            Ordering::Less => node.left.as_deref(),
            Ordering::Greater => node.right.as_deref(),
        };
    }
    None
}

fn insert<K: Ord>(link: Link<K>, key: K, inserted: &mut bool) -> Link<K> {
    let mut node = match link {
        None => {
            *inserted = true;
            return Some(Node::create(key));
        }
        Some(node) => node,
    };
    match key.cmp(&node.key) {
        Ordering::Less => node.left = insert(node.left.take(), key, inserted),
        Ordering::Greater => node.right = insert(node.right.take(), key, inserted),
        Ordering::Equal => return Some(node),
    }
    node.adjust_height();
    Some(rebalance(node))
}

fn delete<K, Q>(link: Link<K>, key: &Q, deleted: &mut bool) -> Link<K>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut node = link?;
    match key.cmp(node.key.borrow()) {
        Ordering::Less => node.left = delete(node.left.take(), key, deleted),
        Ordering::Greater => node.right = delete(node.right.take(), key, deleted),
        Ordering::Equal => {
            *deleted = true;
            match (node.left.take(), node.right.take()) {
                (None, right) => {
                    trace!("unlink node, height {}", node.height);
                    return right;
                }
                (left, None) => {
                    trace!("unlink node, height {}", node.height);
                    return left;
                }
                (left, Some(right)) => {
                    // Move in-order successor's key up, its node is unlinked below
                    let (right, successor_key) = take_min(right);
                    node.key = successor_key;
                    node.left = left;
                    node.right = right;
                }
            }
        }
    }
    node.adjust_height();
    Some(rebalance(node))
}

/// Detaches the leftmost node of the given subtree.
/// Returns the rebalanced remainder of the subtree and the detached key.
fn take_min<K>(mut node: Box<Node<K>>) -> (Link<K>, K) {
    match node.left.take() {
        None => {
            trace!("unlink successor node, height {}", node.height);
            let Node { key, right, .. } = *node;
            (right, key)
        }
        Some(left) => {
            let (left, key) = take_min(left);
            node.left = left;
            node.adjust_height();
            (Some(rebalance(node)), key)
        }
    }
}

fn traverse_in_order<'a, K, F: FnMut(&'a K)>(link: &'a Link<K>, f: &mut F) {
    if let Some(node) = link {
        traverse_in_order(&node.left, f);
        f(&node.key);
        traverse_in_order(&node.right, f);
    }
}

fn drain_in_order<K>(link: Link<K>, keys: &mut Vec<K>) {
    if let Some(node) = link {
        let Node {
            key, left, right, ..
        } = *node;
        drain_in_order(left, keys);
        keys.push(key);
        drain_in_order(right, keys);
    }
}

/// Checks cached heights and the AVL condition of every node.
/// Returns the recomputed height of the subtree.
#[cfg(any(test, feature = "consistency_check"))]
fn check_node<K>(link: &Link<K>) -> usize {
    match link {
        None => 0,
        Some(node) => {
            let left_height = check_node(&node.left);
            let right_height = check_node(&node.right);

            // Check height
            let height = 1 + cmp::max(left_height, right_height);
            assert_eq!(node.height, height);

            // Check AVL condition (nearly balance)
            assert!(left_height <= right_height + 1);
            assert!(right_height <= left_height + 1);

            height
        }
    }
}

#[cfg(test)]
impl<K> AvlTree<K> {
    /// Returns the keys of the root's children, for asserting tree shapes.
    pub(crate) fn root_children(&self) -> (Option<&K>, Option<&K>) {
        match self.root.as_deref() {
            None => (None, None),
            Some(node) => (
                node.left.as_ref().map(|n| &n.key),
                node.right.as_ref().map(|n| &n.key),
            ),
        }
    }

    /// Returns the keys of the children of the node holding the given key.
    pub(crate) fn children_of(&self, key: &K) -> Option<(Option<&K>, Option<&K>)>
    where
        K: Ord,
    {
        find(&self.root, key).map(|node| {
            (
                node.left.as_ref().map(|n| &n.key),
                node.right.as_ref().map(|n| &n.key),
            )
        })
    }
}
