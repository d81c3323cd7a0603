/// Ring scan: coordinate offsets around an origin ordered by Manhattan
/// distance, walked by the ghost chase as a bounded local search.
///
/// Offsets are generated column by column (`dx` outer, `dy` inner, both
/// from `-radius` to `radius`) and then ordered by distance with the
/// pattern-defeating quicksort below. Equal distances keep whatever order
/// that routine leaves them in; ghosts break ties between equally good
/// cells by it.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Offset {
    pub dx: i32,
    pub dy: i32,
}

impl Offset {
    pub const fn new(dx: i32, dy: i32) -> Self {
        Offset { dx, dy }
    }

    pub fn distance(self) -> i32 {
        self.dx.abs() + self.dy.abs()
    }
}

/// Build the ring-scan table for `radius` (negative radii count as 0).
/// The table has `(2r+1)^2` entries in non-decreasing distance order.
pub fn ring_scan(radius: i32) -> Vec<Offset> {
    let r = radius.max(0);
    let side = (2 * r + 1) as usize;
    let mut table = Vec::with_capacity(side * side);
    for dx in -r..=r {
        for dy in -r..=r {
            table.push(Offset::new(dx, dy));
        }
    }
    pdqsort(&mut table, &|a: &Offset, b: &Offset| a.distance() < b.distance());
    table
}

// ── Pattern-defeating quicksort ──

const MAX_INSERTION: usize = 12;
const SHORTEST_NINTHER: usize = 50;
const MAX_SWAPS: usize = 4 * 3;
const PARTIAL_MAX_STEPS: usize = 5;
const SHORTEST_SHIFTING: usize = 50;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Hint {
    Unknown,
    Increasing,
    Decreasing,
}

fn pdqsort<T, F: Fn(&T, &T) -> bool>(v: &mut [T], is_less: &F) {
    let n = v.len();
    let limit = (usize::BITS - n.leading_zeros()) as usize;
    recurse(v, 0, n, limit, is_less);
}

fn less<T, F: Fn(&T, &T) -> bool>(v: &[T], i: usize, j: usize, is_less: &F) -> bool {
    is_less(&v[i], &v[j])
}

fn recurse<T, F: Fn(&T, &T) -> bool>(
    v: &mut [T],
    mut a: usize,
    mut b: usize,
    mut limit: usize,
    is_less: &F,
) {
    let mut was_balanced = true;
    let mut was_partitioned = true;

    loop {
        let len = b - a;

        if len <= MAX_INSERTION {
            insertion_sort(v, a, b, is_less);
            return;
        }

        if limit == 0 {
            heap_sort(v, a, b, is_less);
            return;
        }

        if !was_balanced {
            break_patterns(v, a, b);
            limit -= 1;
        }

        let (mut pivot, mut hint) = choose_pivot(v, a, b, is_less);
        if hint == Hint::Decreasing {
            v[a..b].reverse();
            pivot = (b - 1) - (pivot - a);
            hint = Hint::Increasing;
        }

        if was_balanced
            && was_partitioned
            && hint == Hint::Increasing
            && partial_insertion_sort(v, a, b, is_less)
        {
            return;
        }

        // Pivot equals the element left of the range: everything <= pivot
        // is already in place.
        if a > 0 && !less(v, a - 1, pivot, is_less) {
            a = partition_equal(v, a, b, pivot, is_less);
            continue;
        }

        let (mid, already_partitioned) = partition(v, a, b, pivot, is_less);
        was_partitioned = already_partitioned;

        let (left, right) = (mid - a, b - mid);
        let threshold = len / 8;
        if left < right {
            was_balanced = left >= threshold;
            recurse(v, a, mid, limit, is_less);
            a = mid + 1;
        } else {
            was_balanced = right >= threshold;
            recurse(v, mid + 1, b, limit, is_less);
            b = mid;
        }
    }
}

fn insertion_sort<T, F: Fn(&T, &T) -> bool>(v: &mut [T], a: usize, b: usize, is_less: &F) {
    for i in a + 1..b {
        let mut j = i;
        while j > a && less(v, j, j - 1, is_less) {
            v.swap(j, j - 1);
            j -= 1;
        }
    }
}

fn sift_down<T, F: Fn(&T, &T) -> bool>(
    v: &mut [T],
    lo: usize,
    hi: usize,
    first: usize,
    is_less: &F,
) {
    let mut root = lo;
    loop {
        let mut child = 2 * root + 1;
        if child >= hi {
            return;
        }
        if child + 1 < hi && less(v, first + child, first + child + 1, is_less) {
            child += 1;
        }
        if !less(v, first + root, first + child, is_less) {
            return;
        }
        v.swap(first + root, first + child);
        root = child;
    }
}

fn heap_sort<T, F: Fn(&T, &T) -> bool>(v: &mut [T], a: usize, b: usize, is_less: &F) {
    let first = a;
    let hi = b - a;
    for i in (0..=(hi - 1) / 2).rev() {
        sift_down(v, i, hi, first, is_less);
    }
    for i in (0..hi).rev() {
        v.swap(first, first + i);
        sift_down(v, 0, i, first, is_less);
    }
}

fn partition<T, F: Fn(&T, &T) -> bool>(
    v: &mut [T],
    a: usize,
    b: usize,
    pivot: usize,
    is_less: &F,
) -> (usize, bool) {
    v.swap(a, pivot);
    let (mut i, mut j) = (a + 1, b - 1);

    while i <= j && less(v, i, a, is_less) {
        i += 1;
    }
    while i <= j && !less(v, j, a, is_less) {
        j -= 1;
    }
    if i > j {
        v.swap(j, a);
        return (j, true);
    }
    v.swap(i, j);
    i += 1;
    j -= 1;

    loop {
        while i <= j && less(v, i, a, is_less) {
            i += 1;
        }
        while i <= j && !less(v, j, a, is_less) {
            j -= 1;
        }
        if i > j {
            break;
        }
        v.swap(i, j);
        i += 1;
        j -= 1;
    }
    v.swap(j, a);
    (j, false)
}

fn partition_equal<T, F: Fn(&T, &T) -> bool>(
    v: &mut [T],
    a: usize,
    b: usize,
    pivot: usize,
    is_less: &F,
) -> usize {
    v.swap(a, pivot);
    let (mut i, mut j) = (a + 1, b - 1);

    loop {
        while i <= j && !less(v, a, i, is_less) {
            i += 1;
        }
        while i <= j && less(v, a, j, is_less) {
            j -= 1;
        }
        if i > j {
            break;
        }
        v.swap(i, j);
        i += 1;
        j -= 1;
    }
    i
}

/// Fix a nearly sorted range with a few shifts. Returns true when sorted.
fn partial_insertion_sort<T, F: Fn(&T, &T) -> bool>(
    v: &mut [T],
    a: usize,
    b: usize,
    is_less: &F,
) -> bool {
    let mut i = a + 1;
    for _ in 0..PARTIAL_MAX_STEPS {
        while i < b && !less(v, i, i - 1, is_less) {
            i += 1;
        }

        if i == b {
            return true;
        }

        if b - a < SHORTEST_SHIFTING {
            return false;
        }

        v.swap(i, i - 1);

        // Shift the smaller element left.
        if i - a >= 2 {
            let mut j = i - 1;
            while j >= 1 {
                if !less(v, j, j - 1, is_less) {
                    break;
                }
                v.swap(j, j - 1);
                j -= 1;
            }
        }
        // Shift the greater element right.
        if b - i >= 2 {
            for j in i + 1..b {
                if !less(v, j, j - 1, is_less) {
                    break;
                }
                v.swap(j, j - 1);
            }
        }
    }
    false
}

fn break_patterns<T>(v: &mut [T], a: usize, b: usize) {
    let len = b - a;
    if len >= 8 {
        let mut random = len as u64;
        let modulus = 1usize << (usize::BITS - len.leading_zeros());

        let idx = a + (len / 4) * 2 - 1;
        for i in 0..3 {
            random ^= random << 13;
            random ^= random >> 7;
            random ^= random << 17;
            let mut other = (random as usize) & (modulus - 1);
            if other >= len {
                other -= len;
            }
            v.swap(idx - 1 + i, a + other);
        }
    }
}

fn choose_pivot<T, F: Fn(&T, &T) -> bool>(
    v: &[T],
    a: usize,
    b: usize,
    is_less: &F,
) -> (usize, Hint) {
    let l = b - a;
    let mut swaps = 0;
    let mut i = a + l / 4;
    let mut j = a + l / 4 * 2;
    let mut k = a + l / 4 * 3;

    if l >= 8 {
        if l >= SHORTEST_NINTHER {
            i = median_adjacent(v, i, &mut swaps, is_less);
            j = median_adjacent(v, j, &mut swaps, is_less);
            k = median_adjacent(v, k, &mut swaps, is_less);
        }
        j = median(v, i, j, k, &mut swaps, is_less);
    }

    match swaps {
        0 => (j, Hint::Increasing),
        MAX_SWAPS => (j, Hint::Decreasing),
        _ => (j, Hint::Unknown),
    }
}

fn order2<T, F: Fn(&T, &T) -> bool>(
    v: &[T],
    a: usize,
    b: usize,
    swaps: &mut usize,
    is_less: &F,
) -> (usize, usize) {
    if less(v, b, a, is_less) {
        *swaps += 1;
        return (b, a);
    }
    (a, b)
}

fn median<T, F: Fn(&T, &T) -> bool>(
    v: &[T],
    a: usize,
    b: usize,
    c: usize,
    swaps: &mut usize,
    is_less: &F,
) -> usize {
    let (a, b) = order2(v, a, b, swaps, is_less);
    let (b, _) = order2(v, b, c, swaps, is_less);
    let (_, b) = order2(v, a, b, swaps, is_less);
    b
}

fn median_adjacent<T, F: Fn(&T, &T) -> bool>(
    v: &[T],
    a: usize,
    swaps: &mut usize,
    is_less: &F,
) -> usize {
    median(v, a - 1, a, a + 1, swaps, is_less)
}
