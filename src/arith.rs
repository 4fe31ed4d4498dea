/// Quadratic character mod 3: 0 on multiples of 3, +1 on n = 1 (mod 3),
/// -1 on n = 2 (mod 3). Total over all positive integers.
pub fn chi3(n: u64) -> i32 {
    match n % 3 {
        0 => 0,
        1 => 1,
        _ => -1,
    }
}

/// All primes <= n via sieve of Eratosthenes. Empty for n < 2.
pub fn primes_up_to(n: usize) -> Vec<usize> {
    if n < 2 {
        return Vec::new();
    }
    let mut composite = vec![false; n + 1];
    let mut p = 2usize;
    while p * p <= n {
        if !composite[p] {
            let mut k = p * p;
            while k <= n {
                composite[k] = true;
                k += p;
            }
        }
        p += 1;
    }
    (2..=n).filter(|&i| !composite[i]).collect()
}
