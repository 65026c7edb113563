use lazy_bst::lazy::Tree;
use lazy_bst::Error;

use std::collections::{BTreeSet, HashSet};

use crate::Op;

/// Applies a set of operations to a tree and a set.
/// This way we can ensure that after a random smattering of inserts,
/// soft removals, and collections we have the same values in both.
///
/// Every `Op::Clone` snapshots the tree and the set; the snapshots are returned so the caller
/// can check they were unaffected by everything that came after.
fn do_ops<T>(
    ops: &[Op<T>],
    tree: &mut Tree<T>,
    set: &mut BTreeSet<T>,
) -> Vec<(Tree<T>, BTreeSet<T>)>
where
    T: Ord + Clone,
{
    let mut snapshots = Vec::new();
    for op in ops {
        match op {
            Op::Insert(x) => {
                tree.insert(x.clone());
                set.insert(x.clone());
            }
            Op::Remove(x) => {
                tree.remove(x);
                set.remove(x);
            }
            Op::CollectGarbage => tree.collect_garbage(),
            Op::Clone => snapshots.push((tree.clone(), set.clone())),
        }
    }

    snapshots
}

quickcheck::quickcheck! {
    fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
        let mut tree = Tree::new();
        let mut set = BTreeSet::new();

        let snapshots = do_ops(&ops, &mut tree, &mut set);

        tree.len() == set.len()
            && tree.hard_len() >= tree.len()
            && tree.iter().eq(set.iter())
            && snapshots
                .iter()
                .all(|(tree, set)| tree.len() == set.len() && tree.iter().eq(set.iter()))
    }
}

quickcheck::quickcheck! {
    fn contains(xs: Vec<i8>) -> bool {
        let tree: Tree<_> = xs.iter().copied().collect();

        xs.iter().all(|x| tree.contains(x) && tree.find(x) == Ok(x))
    }
}

quickcheck::quickcheck! {
    fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
        let tree: Tree<_> = xs.iter().copied().collect();
        let added: HashSet<_> = xs.into_iter().collect();
        let nots: HashSet<_> = nots.into_iter().collect();
        let mut nots = nots.difference(&added);

        nots.all(|x| tree.find(x) == Err(Error::NotFound))
    }
}

quickcheck::quickcheck! {
    fn traverse_is_strictly_ascending(xs: Vec<i8>, removes: Vec<i8>) -> bool {
        let mut tree: Tree<_> = xs.iter().copied().collect();
        for x in &removes {
            tree.remove(x);
        }

        let mut seen = Vec::new();
        tree.traverse(|x| seen.push(*x));

        seen.windows(2).all(|w| w[0] < w[1])
            && seen.len() == tree.len()
            && removes.iter().all(|x| !seen.contains(x))
    }
}

quickcheck::quickcheck! {
    fn with_soft_removals(xs: Vec<i8>, removes: Vec<i8>) -> bool {
        let mut tree: Tree<_> = xs.iter().copied().collect();
        let hard_len = tree.hard_len();
        for x in &removes {
            tree.remove(x);
        }

        let still_present: Vec<_> = xs.iter().filter(|x| !removes.contains(x)).collect();

        tree.hard_len() == hard_len
            && removes.iter().all(|x| !tree.contains(x))
            && still_present.iter().all(|x| tree.contains(x))
    }
}

quickcheck::quickcheck! {
    fn resurrection_reuses_nodes(xs: Vec<i8>) -> bool {
        let mut tree: Tree<_> = xs.iter().copied().collect();
        let (len, hard_len) = (tree.len(), tree.hard_len());

        for x in &xs {
            tree.remove(x);
        }
        for x in &xs {
            tree.insert(*x);
        }

        tree.len() == len && tree.hard_len() == hard_len
    }
}

quickcheck::quickcheck! {
    fn collect_garbage_converges(xs: Vec<i8>, removes: Vec<i8>) -> bool {
        let mut tree: Tree<_> = xs.iter().copied().collect();
        for x in &removes {
            tree.remove(x);
        }
        let before: Vec<_> = tree.iter().copied().collect();

        tree.collect_garbage();
        let once = (tree.len(), tree.hard_len(), tree.height());
        tree.collect_garbage();
        let twice = (tree.len(), tree.hard_len(), tree.height());

        once == twice && tree.hard_len() == tree.len() && tree.iter().copied().eq(before)
    }
}

quickcheck::quickcheck! {
    fn min_max_match_model(xs: Vec<i8>, removes: Vec<i8>) -> bool {
        let mut tree: Tree<_> = xs.iter().copied().collect();
        let mut set: BTreeSet<_> = xs.into_iter().collect();
        for x in &removes {
            tree.remove(x);
            set.remove(x);
        }

        tree.find_min().ok() == set.iter().next() && tree.find_max().ok() == set.iter().next_back()
    }
}
