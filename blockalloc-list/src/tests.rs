use super::*;
use quickcheck_macros::quickcheck;

#[derive(Debug, Default)]
struct Numbered {
    number: usize,
    links: Links<Numbered>,
}

unsafe impl Linked for Numbered {
    fn links(&self) -> &Links<Self> {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Links<Self> {
        &mut self.links
    }
}

/// Leaks a `Numbered` onto the heap and returns a pointer suitable for
/// linking; `reclaim` below turns it back into a `Box` so tests don't
/// actually leak.
fn leaked(number: usize) -> NonNull<Numbered> {
    let boxed = Box::new(Numbered { number, links: Links::default() });
    NonNull::from(Box::leak(boxed))
}

unsafe fn reclaim(node: NonNull<Numbered>) -> Box<Numbered> {
    unsafe { Box::from_raw(node.as_ptr()) }
}

fn collect(list: &List<Numbered>) -> Vec<usize> {
    unsafe { list.iter().map(|n| n.number).collect() }
}

#[test]
fn empty_list_has_no_head_or_tail() {
    let list: List<Numbered> = List::new();
    assert!(list.is_empty());
    assert_eq!(list.len(), 0);
    assert!(list.head().is_none());
    assert!(list.tail().is_none());
}

#[test]
fn push_front_sets_head_and_tail_on_first_push() {
    let mut list = List::new();
    let a = leaked(1);
    unsafe { list.push_front(a) };

    assert_eq!(list.head(), Some(a));
    assert_eq!(list.tail(), Some(a));
    assert_eq!(list.len(), 1);

    unsafe { reclaim(list.pop_front().unwrap()) };
}

#[test]
fn push_front_then_back_orders_correctly() {
    let mut list = List::new();
    let a = leaked(1);
    let b = leaked(2);
    let c = leaked(3);

    unsafe {
        list.push_front(b);
        list.push_front(a);
        list.push_back(c);
    }

    assert_eq!(collect(&list), vec![1, 2, 3]);

    unsafe {
        reclaim(list.pop_front().unwrap());
        reclaim(list.pop_front().unwrap());
        reclaim(list.pop_front().unwrap());
    }
}

#[test]
fn unlink_is_o1_and_preserves_neighbor_order() {
    let mut list = List::new();
    let nodes: Vec<_> = (0..5).map(leaked).collect();
    for &n in &nodes {
        unsafe { list.push_back(n) };
    }

    // Unlink the middle node directly, without scanning.
    unsafe { list.unlink(nodes[2]) };
    assert_eq!(collect(&list), vec![0, 1, 3, 4]);
    assert_eq!(list.len(), 4);

    unsafe { reclaim(nodes[2]) };
    while let Some(n) = unsafe { list.pop_front() } {
        unsafe { reclaim(n) };
    }
}

#[test]
fn insert_after_splices_between_neighbors() {
    let mut list = List::new();
    let a = leaked(1);
    let c = leaked(3);
    unsafe {
        list.push_back(a);
        list.push_back(c);
    }

    let b = leaked(2);
    unsafe { list.insert_after(a, b) };

    assert_eq!(collect(&list), vec![1, 2, 3]);
    assert_eq!(list.tail(), Some(c));

    while let Some(n) = unsafe { list.pop_front() } {
        unsafe { reclaim(n) };
    }
}

#[test]
fn remove_first_scans_and_unlinks_matching_node() {
    let mut list = List::new();
    for n in [10, 20, 30, 40] {
        unsafe { list.push_back(leaked(n)) };
    }

    let removed = unsafe { list.remove_first(|n| n.number == 30) }.unwrap();
    assert_eq!(unsafe { removed.as_ref() }.number, 30);
    assert_eq!(collect(&list), vec![10, 20, 40]);

    unsafe { reclaim(removed) };
    while let Some(n) = unsafe { list.pop_front() } {
        unsafe { reclaim(n) };
    }
}

#[quickcheck]
fn push_back_matches_insertion_order(xs: Vec<usize>) -> bool {
    let mut list = List::new();
    for &x in &xs {
        unsafe { list.push_back(leaked(x)) };
    }
    let got = collect(&list);
    while let Some(n) = unsafe { list.pop_front() } {
        unsafe { reclaim(n) };
    }
    got == xs
}

#[quickcheck]
fn pop_front_matches_vecdeque_oracle(xs: Vec<usize>) -> bool {
    use std::collections::VecDeque;

    let mut list = List::new();
    let mut oracle: VecDeque<usize> = VecDeque::new();
    for &x in &xs {
        unsafe { list.push_back(leaked(x)) };
        oracle.push_back(x);
    }

    let mut ok = true;
    while let Some(expected) = oracle.pop_front() {
        match unsafe { list.pop_front() } {
            Some(n) => {
                let b = unsafe { reclaim(n) };
                ok &= b.number == expected;
            }
            None => ok = false,
        }
    }
    ok && list.is_empty()
}

#[quickcheck]
fn len_matches_push_count(xs: Vec<usize>) -> bool {
    let mut list = List::new();
    for &x in &xs {
        unsafe { list.push_back(leaked(x)) };
    }
    let ok = list.len() == xs.len();
    while let Some(n) = unsafe { list.pop_front() } {
        unsafe { reclaim(n) };
    }
    ok
}
