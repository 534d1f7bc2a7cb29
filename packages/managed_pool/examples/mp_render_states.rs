//! Shows a pool of long-lived, de-duplicated objects owned by a context struct.
//!
//! A renderer caches every distinct blend state it has ever used. The states live in a
//! `PoolOwned` pool, so they survive even when no draw call references them, and are only
//! destroyed when the context is torn down. Instead of a global pool, the context owns the pool
//! and is passed by reference to the code that needs it.

use std::collections::HashMap;

use managed_pool::{Handle, ManagedPool, PoolOwned};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
struct BlendDesc {
    source_factor: u8,
    destination_factor: u8,
}

#[derive(Debug)]
struct BlendState {
    desc: BlendDesc,
}

#[derive(Debug, Default)]
struct RenderContext {
    blend_states: ManagedPool<BlendState, 16, PoolOwned>,
    blend_state_ids: HashMap<BlendDesc, u32>,
}

impl RenderContext {
    fn blend_state(&mut self, desc: BlendDesc) -> Handle<BlendState> {
        if let Some(&id) = self.blend_state_ids.get(&desc) {
            return self
                .blend_states
                .get(id)
                .expect("cached blend states are never destroyed before the context");
        }

        let state = self
            .blend_states
            .insert(BlendState { desc })
            .expect("out of memory while creating a blend state");

        let id = self
            .blend_states
            .id_of(&state)
            .expect("the state was just created by this pool");
        self.blend_state_ids.insert(desc, id);

        state
    }
}

fn draw(context: &mut RenderContext, desc: BlendDesc) {
    let state = context.blend_state(desc);

    println!(
        "Drawing with {:?} (state {} shared by {} handles)",
        state.desc,
        context.blend_states.id_of(&state).unwrap(),
        Handle::reference_count(&state)
    );
}

fn main() {
    let mut context = RenderContext::default();

    let opaque = BlendDesc {
        source_factor: 1,
        destination_factor: 0,
    };
    let additive = BlendDesc {
        source_factor: 1,
        destination_factor: 1,
    };

    draw(&mut context, opaque);
    draw(&mut context, additive);
    draw(&mut context, opaque);

    // Both states are still cached even though no handle references them.
    println!(
        "Context caches {} distinct blend states",
        context.blend_states.len()
    );

    for state in &context.blend_states {
        println!("Cached: {:?}", state.desc);
    }
}
