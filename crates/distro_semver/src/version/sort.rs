use std::cmp::Ordering;
use std::sync::Mutex;

use super::{Version, RELEASE_TYPE_SLOT, SLOT_COUNT, SPECIFIER_TYPE_SLOT};

/// Below this many elements a residual comparison sort is called instead of
/// a radix pass. Benchmarked around this value; some architectures tolerate
/// going as low as 64 or 32.
const RESIDUAL_SORT_THRESHOLD: usize = 128;

/// Starting size for fresh scratch buffers. Pooled buffers grow past this
/// whenever a larger collection comes along.
const INITIAL_SCRATCH_CAPACITY: usize = 40 * 1024;

/// Process-wide pool of scratch buffers for [`sort_versions`]. Buffers are
/// stored empty and with their references cleared, so nothing of a caller
/// outlives the call that borrowed it.
static SCRATCH_POOL: Mutex<Vec<Vec<Option<&'static Version>>>> = Mutex::new(Vec::new());

fn acquire_scratch<'v>(len: usize) -> Vec<Option<&'v Version>> {
    let recycled = SCRATCH_POOL
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .pop();
    // A pooled buffer is empty, and `&'static` narrows to `&'v` by variance.
    let mut buf: Vec<Option<&'v Version>> =
        recycled.unwrap_or_else(|| Vec::with_capacity(INITIAL_SCRATCH_CAPACITY));
    buf.resize(len, None);
    buf
}

fn release_scratch<'v>(mut buf: Vec<Option<&'v Version>>) {
    buf.fill(None);
    buf.clear();
    // SAFETY: the vector is empty, so this only recycles the allocation;
    // no reference of lifetime 'v reaches the pool.
    let buf: Vec<Option<&'static Version>> =
        unsafe { std::mem::transmute::<Vec<Option<&'v Version>>, Vec<Option<&'static Version>>>(buf) };
    SCRATCH_POOL
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .push(buf);
}

/// Ascending by [`Version::compare`], with nil entries after everything.
fn ptr_order(a: Option<&Version>, b: Option<&Version>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.compare(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn is_sorted_run(versions: &[Option<&Version>]) -> bool {
    versions
        .windows(2)
        .all(|pair| ptr_order(pair[0], pair[1]) != Ordering::Greater)
}

/// Maps small values to themselves and everything larger to one of four
/// classes by byte width, keeping keys order-preserving as an upper bound.
/// `x` must be non-negative.
fn magnitude_aware_key(x: i32) -> u8 {
    if x <= 11 {
        return x as u8;
    }
    // For all larger numbers, store the number of bytes plus 11.
    if x <= 0xffff {
        if x <= 0xff {
            return 12;
        }
        return 13;
    }
    if x <= 0xff_ffff {
        return 14;
    }
    15
}

/// Bias applied to a slot before key derivation. Lifts the signed type slots
/// into the non-negative range: alpha maps to 0, p to 6.
fn field_adjustment(slot: usize) -> i32 {
    if slot == RELEASE_TYPE_SLOT || slot == SPECIFIER_TYPE_SLOT {
        4
    } else {
        0
    }
}

fn key_value(version: &Version, slot: usize) -> i32 {
    version.slots[slot] + field_adjustment(slot)
}

/// Derives a histogram key from the two adjacent slots at `key_index`. The
/// order established by these keys is ascending but not total: large values
/// map to low-resolution classes, and when the first slot is already out of
/// the verbatim band the lower nibble repeats its class so that the descent
/// refines both slots.
fn two_field_key(version: &Version, key_index: usize) -> u8 {
    let upper = magnitude_aware_key(key_value(version, key_index)) << 4;
    if upper >= 12 << 4 {
        return upper | (upper >> 4);
    }
    upper | magnitude_aware_key(key_value(version, key_index + 1))
}

/// Reorders the pointers so that the versions appear in ascending order as
/// established by [`Version::compare`]; the build is not considered. Nil
/// entries end up contiguous at the tail, and the sort is stable.
///
/// Large collections go through radix-sort variants expected to run in
/// O(n), deferring to a comparison sort on degenerated collections; the
/// scratch space they need is borrowed from a process-wide pool.
pub fn sort_versions(versions: &mut [Option<&Version>]) {
    if versions.len() < RESIDUAL_SORT_THRESHOLD {
        versions.sort_by(|a, b| ptr_order(*a, *b));
        return;
    }

    let mut scratch = acquire_scratch(versions.len());
    multikey_radix_sort(versions, &mut scratch, 0);
    release_scratch(scratch);
}

/// One counting-sort run over the combined key of slots `key_index` and
/// `key_index + 1`, scattered stably through `scratch`, followed by the
/// per-bucket descent. Nil entries are skipped and collect at the tail.
fn multikey_radix_sort<'v>(
    versions: &mut [Option<&'v Version>],
    scratch: &mut [Option<&'v Version>],
    key_index: usize,
) {
    let mut offsets = [0usize; 256];
    for version in versions.iter().flatten() {
        offsets[two_field_key(version, key_index) as usize] += 1;
    }
    let mut watermark = 0;
    for offset in offsets.iter_mut() {
        let count = *offset;
        *offset = watermark;
        watermark += count;
    }

    let len = versions.len();
    scratch[..len].copy_from_slice(versions);
    versions[watermark..].fill(None);
    for version in scratch[..len].iter().flatten() {
        let key = two_field_key(version, key_index) as usize;
        versions[offsets[key]] = Some(*version);
        offsets[key] += 1;
    }

    // After the scatter every entry of `offsets` is its bucket's ceiling.
    multikey_descent(versions, scratch, key_index, &offsets);
}

fn multikey_descent<'v>(
    versions: &mut [Option<&'v Version>],
    scratch: &mut [Option<&'v Version>],
    key_index: usize,
    offsets: &[usize; 256],
) {
    let mut floor = 0;
    for (key, &ceiling) in offsets.iter().enumerate() {
        let stride = ceiling - floor;
        if stride < 2 {
            floor = ceiling;
            continue;
        }
        let bucket = &mut versions[floor..ceiling];
        floor = ceiling;

        if is_sorted_run(bucket) {
            continue;
        }
        if stride < RESIDUAL_SORT_THRESHOLD {
            bucket.sort_by(|a, b| ptr_order(*a, *b));
            continue;
        }

        let key = key as u8;
        if (key >> 4) >= 12 {
            // The first slot of the pair did not resolve; sort it on its
            // own, over only the byte width its class calls for.
            let max_bits = ((key >> 4) - 11) * 8;
            radix_sort(bucket, scratch, key_index, max_bits);
        } else if (key & 0x0f) >= 12 {
            // First slot resolved, the second did not.
            let max_bits = ((key & 0x0f) - 11) * 8;
            radix_sort(bucket, scratch, key_index + 1, max_bits);
        } else if key_index + 3 < SLOT_COUNT {
            multikey_radix_sort(bucket, scratch, key_index + 2);
        } else {
            bucket.sort_by(|a, b| ptr_order(*a, *b));
        }
    }
}

/// Classical LSB-first radix sort on the single slot `key_index`,
/// considering `max_bits` low bits; any excess high bits are known to be
/// zero. Expects its input to be free of nil entries.
fn radix_sort<'v>(
    versions: &mut [Option<&'v Version>],
    scratch: &mut [Option<&'v Version>],
    key_index: usize,
    max_bits: u8,
) {
    let len = versions.len();
    let mut in_place = true;
    let mut from_bits = 0;
    while from_bits < max_bits {
        if in_place {
            radix_pass(versions, &mut scratch[..len], key_index, from_bits);
        } else {
            radix_pass(&scratch[..len], versions, key_index, from_bits);
        }
        in_place = !in_place;
        from_bits += 8;
    }
    if !in_place {
        versions.copy_from_slice(&scratch[..len]);
    }

    radix_descent(versions, scratch, key_index);
}

fn radix_pass<'v>(
    from: &[Option<&'v Version>],
    to: &mut [Option<&'v Version>],
    key_index: usize,
    from_bits: u8,
) {
    let mut offsets = [0usize; 256];
    for version in from.iter().flatten() {
        offsets[(key_value(version, key_index) >> u32::from(from_bits)) as u8 as usize] += 1;
    }
    let mut watermark = 0;
    for offset in offsets.iter_mut() {
        let count = *offset;
        *offset = watermark;
        watermark += count;
    }
    for version in from.iter().flatten() {
        let key = (key_value(version, key_index) >> u32::from(from_bits)) as u8 as usize;
        to[offsets[key]] = Some(*version);
        offsets[key] += 1;
    }
}

fn slot_of(entry: Option<&Version>, key_index: usize) -> i32 {
    let version = entry.expect("nil entries are stripped before the radix passes");
    key_value(version, key_index)
}

/// The single-key variant cannot read strides off a histogram the way the
/// multikey run can, so the collection is visited once more to find runs of
/// equal values worth refining.
fn radix_descent<'v>(
    versions: &mut [Option<&'v Version>],
    scratch: &mut [Option<&'v Version>],
    key_index: usize,
) {
    let len = versions.len();
    let mut start = 0;
    let mut last_value = slot_of(versions[0], key_index);
    for i in 1..len {
        let value = slot_of(versions[i], key_index);
        if value == last_value {
            continue;
        }
        refine_stride(&mut versions[start..i], scratch, key_index);
        start = i;
        last_value = value;
    }
    refine_stride(&mut versions[start..], scratch, key_index);
}

fn refine_stride<'v>(
    stride: &mut [Option<&'v Version>],
    scratch: &mut [Option<&'v Version>],
    key_index: usize,
) {
    if stride.len() < 2 || is_sorted_run(stride) {
        return;
    }
    if stride.len() < RESIDUAL_SORT_THRESHOLD || key_index + 2 >= SLOT_COUNT {
        stride.sort_by(|a, b| ptr_order(*a, *b));
        return;
    }
    multikey_radix_sort(stride, scratch, key_index + 1);
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use itertools::iproduct;
    use rand::seq::SliceRandom;

    use super::super::Version;
    use super::{magnitude_aware_key, sort_versions, two_field_key, RESIDUAL_SORT_THRESHOLD};

    fn corpus() -> Vec<Version> {
        // Majors cover every magnitude class, with enough in the two-byte
        // band to push that bucket past the residual-sort threshold.
        let majors = [
            0, 1, 5, 12, 255, 256, 300, 1000, 40000, 65535, 65536, 16777216, 900000000,
        ];
        let minors = [0, 3, 11, 300];
        let patches = [0, 7];
        let suffixes = ["", "-alpha", "-beta2", "-rc1", "-r1", "-p2", "+build9"];
        iproduct!(majors, minors, patches, suffixes)
            .map(|(major, minor, patch, suffix)| {
                format!("{major}.{minor}.{patch}{suffix}").parse().unwrap()
            })
            .collect()
    }

    #[test]
    fn magnitude_classes() {
        assert_eq!(magnitude_aware_key(0), 0);
        assert_eq!(magnitude_aware_key(11), 11);
        assert_eq!(magnitude_aware_key(12), 12);
        assert_eq!(magnitude_aware_key(255), 12);
        assert_eq!(magnitude_aware_key(256), 13);
        assert_eq!(magnitude_aware_key(65535), 13);
        assert_eq!(magnitude_aware_key(65536), 14);
        assert_eq!(magnitude_aware_key(16777215), 14);
        assert_eq!(magnitude_aware_key(16777216), 15);
    }

    #[test]
    fn two_field_keys_bias_the_type_slots() {
        let alpha: Version = "1.0.0-alpha".parse().unwrap();
        assert_eq!(two_field_key(&alpha, 4), 0x00);

        let patched: Version = "1.0.0-p2".parse().unwrap();
        assert_eq!(two_field_key(&patched, 4), 0x62);

        // An unresolved first slot forces the lower nibble to its class.
        let big: Version = "4096.1".parse().unwrap();
        assert_eq!(two_field_key(&big, 0), 0xdd);
    }

    #[test]
    fn sorts_small_collections() {
        let owned: Vec<Version> = ["2.0", "1.0.0-rc", "0.5", "1.0"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let mut ptrs: Vec<Option<&Version>> = owned.iter().map(Some).collect();
        ptrs.insert(1, None);

        sort_versions(&mut ptrs);

        let order: Vec<String> = ptrs.iter().flatten().map(|v| v.to_string()).collect();
        assert_eq!(order, ["0.5.0", "1.0.0-rc", "1.0.0", "2.0.0"]);
        assert!(ptrs[4].is_none());
    }

    #[test]
    fn sorts_large_collections_with_nil_entries() {
        let owned = corpus();
        let mut ptrs: Vec<Option<&Version>> = owned.iter().map(Some).collect();
        for slot in (0..ptrs.len()).step_by(97) {
            ptrs.insert(slot, None);
        }
        ptrs.shuffle(&mut rand::rng());
        let reference = ptrs.clone();

        sort_versions(&mut ptrs);

        let non_nil = ptrs.iter().take_while(|entry| entry.is_some()).count();
        assert_eq!(non_nil, owned.len());
        assert!(
            ptrs[non_nil..].iter().all(Option::is_none),
            "nil entries must be contiguous at the tail"
        );
        for pair in ptrs[..non_nil].windows(2) {
            let (a, b) = (pair[0].unwrap(), pair[1].unwrap());
            assert_ne!(a.compare(b), Ordering::Greater, "wrong order: {a} before {b}");
        }
        // The multiset of pointers is preserved.
        for original in reference.iter().flatten() {
            assert!(ptrs
                .iter()
                .flatten()
                .any(|sorted| std::ptr::eq(*sorted, *original)));
        }
    }

    #[test]
    fn equal_versions_keep_their_relative_order() {
        let owned: Vec<Version> = (1..=200)
            .map(|build| format!("3.1.4+build{build}").parse().unwrap())
            .collect();
        let mut ptrs: Vec<Option<&Version>> = owned.iter().map(Some).collect();

        sort_versions(&mut ptrs);

        let builds: Vec<u32> = ptrs.iter().flatten().map(|v| v.build()).collect();
        assert_eq!(builds, (1..=200).collect::<Vec<u32>>());
    }

    /// A mixed distribution dump. The odd entry does not parse and gets
    /// substituted before ordering, as real consumers of this sorter do.
    #[test]
    fn sorts_a_distribution_dump() {
        let data = std::fs::read_to_string(
            std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../test-data/versions.txt"),
        )
        .unwrap();
        let fallback: Version = "1.2.3-beta5".parse().unwrap();
        let mut substitutes = 0usize;
        let owned: Vec<Version> = data
            .lines()
            .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
            .map(|line| {
                line.parse().unwrap_or_else(|_| {
                    substitutes += 1;
                    fallback
                })
            })
            .collect();
        assert!(owned.len() >= RESIDUAL_SORT_THRESHOLD);
        assert!(substitutes > 0, "the dump is expected to contain strays");

        let mut ptrs: Vec<Option<&Version>> = owned.iter().map(Some).collect();
        ptrs.shuffle(&mut rand::rng());

        sort_versions(&mut ptrs);

        assert!(super::is_sorted_run(&ptrs));
        assert_eq!(ptrs.iter().flatten().count(), owned.len());
    }

    #[test]
    fn pooled_scratch_is_reusable() {
        for _ in 0..3 {
            let owned = corpus();
            let mut ptrs: Vec<Option<&Version>> = owned.iter().map(Some).collect();
            ptrs.shuffle(&mut rand::rng());
            sort_versions(&mut ptrs);
            assert!(ptrs.iter().all(Option::is_some));
            assert!(super::is_sorted_run(&ptrs));
        }
    }
}
