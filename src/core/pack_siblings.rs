//! Front-chain sibling packing and smallest enclosing circle.
//!
//! Siblings are placed one by one tangent to two circles of the current
//! front chain, always next to the pair closest to the centroid, which gives
//! dense non-overlapping arrangements. The enclosing circle is the
//! move-to-front Welzl construction over circles, fed in a fixed
//! pseudo-random order so layouts stay deterministic.

/// Circle in local layout coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Circle {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl Circle {
    pub(crate) const fn with_radius(r: f64) -> Self {
        Self { x: 0.0, y: 0.0, r }
    }
}

/// Packs `circles` in place around the origin and returns the radius of the
/// circle enclosing all of them (centered at the origin after packing).
pub(crate) fn pack_siblings(circles: &mut [Circle]) -> Option<f64> {
    let n = circles.len();
    if n == 0 {
        return Some(0.0);
    }

    circles[0].x = 0.0;
    circles[0].y = 0.0;
    if n == 1 {
        return Some(circles[0].r);
    }

    let (first_r, second_r) = (circles[0].r, circles[1].r);
    circles[0].x = -second_r;
    circles[1].x = first_r;
    circles[1].y = 0.0;
    if n == 2 {
        return Some(first_r + second_r);
    }

    let (first, second) = (circles[0], circles[1]);
    place(second, first, &mut circles[2]);

    // Doubly linked front chain over circle indices.
    let mut next = vec![0usize; n];
    let mut previous = vec![0usize; n];
    next[0] = 1;
    previous[1] = 0;
    next[1] = 2;
    previous[2] = 1;
    next[2] = 0;
    previous[0] = 2;

    let (mut a, mut b) = (0usize, 1usize);
    let mut index = 3;
    'pack: while index < n {
        let (circle_a, circle_b) = (circles[a], circles[b]);
        place(circle_a, circle_b, &mut circles[index]);
        let candidate = circles[index];

        // Closest intersecting circle on the front chain, by chain distance.
        let (mut j, mut k) = (next[b], previous[a]);
        let (mut sj, mut sk) = (circles[b].r, circles[a].r);
        loop {
            if sj <= sk {
                if intersects(circles[j], candidate) {
                    b = j;
                    next[a] = b;
                    previous[b] = a;
                    continue 'pack;
                }
                sj += circles[j].r;
                j = next[j];
            } else {
                if intersects(circles[k], candidate) {
                    a = k;
                    next[a] = b;
                    previous[b] = a;
                    continue 'pack;
                }
                sk += circles[k].r;
                k = previous[k];
            }
            if j == next[k] {
                break;
            }
        }

        previous[index] = a;
        next[index] = b;
        next[a] = index;
        previous[b] = index;
        b = index;

        let mut best = score(circles, &next, a);
        let mut node = index;
        loop {
            node = next[node];
            if node == b {
                break;
            }
            let node_score = score(circles, &next, node);
            if node_score < best {
                a = node;
                best = node_score;
            }
        }
        b = next[a];
        index += 1;
    }

    let mut chain = vec![circles[b]];
    let mut node = next[b];
    while node != b {
        chain.push(circles[node]);
        node = next[node];
    }

    let enclosing = enclose(&chain)?;
    for circle in circles.iter_mut() {
        circle.x -= enclosing.x;
        circle.y -= enclosing.y;
    }
    Some(enclosing.r)
}

/// Places `c` tangent to both `a` and `b`.
fn place(b: Circle, a: Circle, c: &mut Circle) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let d2 = dx * dx + dy * dy;
    if d2 > 0.0 {
        let a2 = (a.r + c.r) * (a.r + c.r);
        let b2 = (b.r + c.r) * (b.r + c.r);
        if a2 > b2 {
            let x = (d2 + b2 - a2) / (2.0 * d2);
            let y = (b2 / d2 - x * x).max(0.0).sqrt();
            c.x = b.x - x * dx - y * dy;
            c.y = b.y - x * dy + y * dx;
        } else {
            let x = (d2 + a2 - b2) / (2.0 * d2);
            let y = (a2 / d2 - x * x).max(0.0).sqrt();
            c.x = a.x + x * dx - y * dy;
            c.y = a.y + x * dy + y * dx;
        }
    } else {
        c.x = a.x + c.r;
        c.y = a.y;
    }
}

fn intersects(a: Circle, b: Circle) -> bool {
    let dr = a.r + b.r - 1e-6;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

fn score(circles: &[Circle], next: &[usize], node: usize) -> f64 {
    let a = circles[node];
    let b = circles[next[node]];
    let ab = a.r + b.r;
    let (dx, dy) = if ab > 0.0 {
        ((a.x * b.r + b.x * a.r) / ab, (a.y * b.r + b.y * a.r) / ab)
    } else {
        ((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    };
    dx * dx + dy * dy
}

/// Smallest circle enclosing every circle in `circles`.
pub(crate) fn enclose(circles: &[Circle]) -> Option<Circle> {
    let mut shuffled = circles.to_vec();
    shuffle(&mut shuffled);

    let mut basis: Vec<Circle> = Vec::new();
    let mut enclosing: Option<Circle> = None;
    let mut index = 0;
    while index < shuffled.len() {
        let circle = shuffled[index];
        if enclosing.is_some_and(|current| encloses_weak(current, circle)) {
            index += 1;
        } else {
            basis = extend_basis(&basis, circle)?;
            enclosing = Some(enclose_basis(&basis)?);
            index = 0;
        }
    }
    enclosing
}

fn shuffle(circles: &mut [Circle]) {
    // Linear congruential generator with a fixed seed.
    let mut state: u64 = 1;
    let mut remaining = circles.len();
    while remaining > 0 {
        state = (1_664_525 * state + 1_013_904_223) % 4_294_967_296;
        let random = state as f64 / 4_294_967_296.0;
        let pick = (random * remaining as f64) as usize;
        remaining -= 1;
        circles.swap(remaining, pick.min(remaining));
    }
}

fn extend_basis(basis: &[Circle], p: Circle) -> Option<Vec<Circle>> {
    if encloses_weak_all(p, basis) {
        return Some(vec![p]);
    }

    for &member in basis {
        if encloses_not(p, member) && encloses_weak_all(enclose_basis2(member, p), basis) {
            return Some(vec![member, p]);
        }
    }

    for i in 0..basis.len().saturating_sub(1) {
        for j in (i + 1)..basis.len() {
            let (bi, bj) = (basis[i], basis[j]);
            if encloses_not(enclose_basis2(bi, bj), p)
                && encloses_not(enclose_basis2(bi, p), bj)
                && encloses_not(enclose_basis2(bj, p), bi)
                && encloses_weak_all(enclose_basis3(bi, bj, p), basis)
            {
                return Some(vec![bi, bj, p]);
            }
        }
    }

    None
}

fn encloses_not(a: Circle, b: Circle) -> bool {
    let dr = a.r - b.r;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr < 0.0 || dr * dr < dx * dx + dy * dy
}

fn encloses_weak(a: Circle, b: Circle) -> bool {
    let dr = a.r - b.r + a.r.max(b.r).max(1.0) * 1e-9;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

fn encloses_weak_all(a: Circle, basis: &[Circle]) -> bool {
    basis.iter().all(|&member| encloses_weak(a, member))
}

fn enclose_basis(basis: &[Circle]) -> Option<Circle> {
    match basis {
        [a] => Some(*a),
        [a, b] => Some(enclose_basis2(*a, *b)),
        [a, b, c] => Some(enclose_basis3(*a, *b, *c)),
        _ => None,
    }
}

fn enclose_basis2(a: Circle, b: Circle) -> Circle {
    let x21 = b.x - a.x;
    let y21 = b.y - a.y;
    let r21 = b.r - a.r;
    let l = (x21 * x21 + y21 * y21).sqrt();
    if l == 0.0 {
        return if a.r >= b.r { a } else { b };
    }
    Circle {
        x: (a.x + b.x + x21 / l * r21) / 2.0,
        y: (a.y + b.y + y21 / l * r21) / 2.0,
        r: (l + a.r + b.r) / 2.0,
    }
}

fn enclose_basis3(a: Circle, b: Circle, c: Circle) -> Circle {
    let (x1, y1, r1) = (a.x, a.y, a.r);
    let (x2, y2, r2) = (b.x, b.y, b.r);
    let (x3, y3, r3) = (c.x, c.y, c.r);
    let a2 = x1 - x2;
    let a3 = x1 - x3;
    let b2 = y1 - y2;
    let b3 = y1 - y3;
    let c2 = r2 - r1;
    let c3 = r3 - r1;
    let d1 = x1 * x1 + y1 * y1 - r1 * r1;
    let d2 = d1 - x2 * x2 - y2 * y2 + r2 * r2;
    let d3 = d1 - x3 * x3 - y3 * y3 + r3 * r3;
    let ab = a3 * b2 - a2 * b3;
    let xa = (b2 * d3 - b3 * d2) / (ab * 2.0) - x1;
    let xb = (b3 * c2 - b2 * c3) / ab;
    let ya = (a3 * d2 - a2 * d3) / (ab * 2.0) - y1;
    let yb = (a2 * c3 - a3 * c2) / ab;
    let qa = xb * xb + yb * yb - 1.0;
    let qb = 2.0 * (r1 + xa * xb + ya * yb);
    let qc = xa * xa + ya * ya - r1 * r1;
    let r = -(if qa.abs() > 1e-6 {
        (qb + (qb * qb - 4.0 * qa * qc).sqrt()) / (2.0 * qa)
    } else {
        qc / qb
    });
    Circle {
        x: x1 + xa + xb * r,
        y: y1 + ya + yb * r,
        r,
    }
}

#[cfg(test)]
mod tests {
    use super::{Circle, enclose, pack_siblings};

    fn overlap(a: Circle, b: Circle) -> f64 {
        let distance = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
        a.r + b.r - distance
    }

    #[test]
    fn two_siblings_touch_and_are_centered() {
        let mut circles = vec![Circle::with_radius(1.0), Circle::with_radius(3.0)];
        let radius = pack_siblings(&mut circles).expect("pack");
        assert!((radius - 4.0).abs() <= 1e-9);
        assert!(overlap(circles[0], circles[1]).abs() <= 1e-9);
    }

    #[test]
    fn many_siblings_do_not_overlap_and_stay_enclosed() {
        let mut circles: Vec<Circle> = (1..=25)
            .map(|i| Circle::with_radius(f64::from(i % 7 + 1)))
            .collect();
        let radius = pack_siblings(&mut circles).expect("pack");

        for (i, a) in circles.iter().enumerate() {
            let distance = (a.x * a.x + a.y * a.y).sqrt();
            assert!(distance + a.r <= radius + 1e-6);
            for b in &circles[(i + 1)..] {
                assert!(overlap(*a, *b) <= 1e-6);
            }
        }
    }

    #[test]
    fn enclosing_circle_of_one_is_itself() {
        let circle = Circle {
            x: 2.0,
            y: -1.0,
            r: 5.0,
        };
        assert_eq!(enclose(&[circle]), Some(circle));
    }
}
