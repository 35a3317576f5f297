use avl_tree::AvlTree;

fn main() {
    let mut tree = AvlTree::new();
    tree.insert(30);
    tree.insert(20);
    tree.insert(10);
    tree.insert(20);
    tree.insert(40);
    tree.insert(50);
    assert_eq!(tree.root(), Some(&20));
    assert!(tree.search(&40));
    tree.delete(&40);
    assert!(!tree.search(&40));

    print!("{{ ");
    for key in tree.in_order_traversal() {
        print!("{key}, ");
    }
    println!("}}");
    println!("height: {}, len: {}", tree.height(), tree.len());
}
