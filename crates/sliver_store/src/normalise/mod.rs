use crate::build::{Environment, run_program};
use crate::realise::realise_slice;
use crate::scan::filter_references;
use crate::store::Store;
use log::debug;
use sliver_core::error::{Error, Result};
use sliver_core::expr::{Expression, Slice, SliceElem};
use sliver_core::hash::Id;
use std::collections::{HashMap, HashSet};

/// Drive the expression stored under `id` to its normal form, building
/// derivations as needed. A freshly produced slice is written back to the
/// store and linked as the successor of the derivation it came from.
pub async fn normalise(store: &Store, id: Id) -> Result<Slice> {
    let mut id = id;

    // Jump along known successors first. Every hop is re-verified; a
    // broken entry is a cache miss, not an error. The visited set stops
    // cycles.
    let mut term = None;
    let mut visited = HashSet::from([id]);
    while let Some(successor) = store.query_successor(&id).await? {
        if !visited.insert(successor) {
            debug!("successor cycle at {successor}, staying with {id}");
            break;
        }
        match store.term_from_id(&successor).await {
            Ok((expr, _)) => {
                debug!("successor {id} -> {successor}");
                id = successor;
                term = Some(expr);
            }
            Err(err) => {
                debug!("broken successor {id} -> {successor}: {err}");
                break;
            }
        }
    }

    let expr = match term {
        Some(expr) => expr,
        None => store.term_from_id(&id).await?.0,
    };

    let derive = match expr {
        // Already in normal form?
        Expression::Slice(slice) => return Ok(slice),
        Expression::Derive(derive) => derive,
        other => return Err(Error::bad_term("not a derive", other.to_string())),
    };

    debug!("normalising derivation {id}");

    if derive.platform != *store.system() {
        return Err(Error::PlatformMismatch {
            required: derive.platform,
            host: store.system().clone(),
        });
    }

    // Normalise and install every input, remembering the elements and
    // paths its closure contributes. Elements are deduplicated by content
    // id; inputs sharing an element contribute it once.
    let mut input_elems: Vec<SliceElem> = Vec::new();
    let mut input_ids = HashSet::new();
    let mut input_paths = HashSet::new();
    for input in &derive.inputs {
        let slice = Box::pin(normalise(store, *input)).await?;
        realise_slice(store, &slice).await?;
        for elem in slice.elems {
            input_paths.insert(elem.path.clone());
            if input_ids.insert(elem.id) {
                input_elems.push(elem);
            }
        }
    }

    let mut env = Environment::new();
    for (name, value) in &derive.bindings {
        env.insert(name.clone(), value.clone());
    }

    // Refuse to build over anything that already sits where an output
    // wants to go.
    for (path, _) in &derive.outputs {
        if Store::path_exists(path) {
            return Err(Error::OutputObstructed(path.clone()));
        }
    }

    run_program(store.config(), &derive.builder, &env)?;

    let mut slice = Slice::default();
    let mut required = Vec::new();
    for (path, declared) in &derive.outputs {
        if !Store::path_exists(path) {
            return Err(Error::BuildIncomplete(path.clone()));
        }
        store.register_path(path, declared).await?;
        slice.roots.push(*declared);

        // An output only references the input elements it textually
        // mentions.
        let referenced = filter_references(path, &input_paths).await?;
        let refs: Vec<Id> = input_elems
            .iter()
            .filter(|elem| referenced.contains(&elem.path))
            .map(|elem| elem.id)
            .collect();
        required.extend(refs.iter().copied());
        slice.elems.push(SliceElem {
            path: path.clone(),
            id: *declared,
            refs,
        });
    }

    // Referenced input elements join the slice, closed over their own
    // refs so every reference edge stays inside it.
    let needed = close_over_refs(&input_elems, required);
    slice
        .elems
        .extend(input_elems.into_iter().filter(|elem| needed.contains(&elem.id)));

    store_successor(store, &id, &slice).await?;
    Ok(slice)
}

fn close_over_refs(elems: &[SliceElem], seed: Vec<Id>) -> HashSet<Id> {
    let by_id: HashMap<Id, &SliceElem> = elems.iter().map(|elem| (elem.id, elem)).collect();
    let mut needed = HashSet::new();
    let mut work = seed;
    while let Some(id) = work.pop() {
        if !needed.insert(id) {
            continue;
        }
        if let Some(elem) = by_id.get(&id) {
            work.extend(elem.refs.iter().copied());
        }
    }
    needed
}

/// Persist a freshly produced normal form and link it as the successor of
/// the derivation it came from.
async fn store_successor(store: &Store, id: &Id, slice: &Slice) -> Result<Id> {
    let expr = Expression::Slice(slice.clone());
    let (slice_id, _) = store.write_term(&expr, &format!("-s-{id}")).await?;
    store.register_successor(id, &slice_id).await?;
    debug!("memoised {id} -> {slice_id}");
    Ok(slice_id)
}
