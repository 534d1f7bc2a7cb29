//! Basic usage of the `managed_pool` crate:
//!
//! * Creating a pool.
//! * Adding items.
//! * Sharing items through handles.
//! * Looking items up by ID.
//! * Iterating over items.

use managed_pool::{Handle, ManagedPool};

fn main() {
    let mut pool = ManagedPool::<String>::new();

    // Adding an item gives you a handle, which keeps the item alive.
    let alice = pool.insert("Alice".to_string()).unwrap();
    let bob = pool.insert("Bob".to_string()).unwrap();
    let charlie = pool.insert("Charlie".to_string()).unwrap();

    println!(
        "Object pool contains {} items, with an auto-adjusting capacity of {}",
        pool.len(),
        pool.capacity()
    );

    // Handles dereference to the item.
    println!("Retrieved item: {}", *alice);

    // Every item has an ID that can be used to find it again.
    let bob_id = pool.id_of(&bob).unwrap();
    let bob_again = pool.get(bob_id).unwrap();
    println!(
        "Item {bob_id} is {}, referenced by {} handles",
        *bob_again,
        Handle::reference_count(&bob_again)
    );

    // Dropping the last handle destroys the item and frees its slot for reuse.
    drop(bob);
    drop(bob_again);
    println!("After dropping Bob, the pool contains {} items", pool.len());

    // Iteration visits the remaining items in the order they were added.
    for name in &pool {
        println!("Still in the pool: {}", *name);
    }

    // A handle that is the only reference to its item can modify it.
    let mut alice = alice;
    Handle::get_mut(&mut alice).unwrap().push_str(" Smith");
    println!("Modified item: {}", *alice);

    drop(charlie);
}
