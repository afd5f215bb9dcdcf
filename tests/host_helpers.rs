use grouped_metadata::net;
use grouped_metadata::paths::{self, CaseSensitivity};
use grouped_metadata::platform;
use std::net::Ipv4Addr;
use std::path::Path;

#[test]
fn host_case_mode_follows_platform_flag() {
    let expected = if platform::current().case_sensitive_fs {
        CaseSensitivity::Sensitive
    } else {
        CaseSensitivity::Insensitive
    };
    assert_eq!(CaseSensitivity::host(), expected);
}

#[test]
fn host_case_mode_drives_path_equality() {
    let a = Path::new("/srv/Data");
    let b = Path::new("/srv/data");
    let equal = paths::paths_equal(a, b, CaseSensitivity::host());
    assert_eq!(equal, !platform::current().case_sensitive_fs);
}

#[test]
fn relative_path_resolves_back_to_target() {
    let base = paths::normalize_dir(Path::new("base/dir")).unwrap();
    let target = paths::normalize_dir(Path::new("other/file.json")).unwrap();
    let rel = paths::relative_path(&base, &target).unwrap();
    let resolved = paths::normalize_dir(&base.join(rel)).unwrap();
    assert!(paths::paths_equal(&resolved, &target, CaseSensitivity::Sensitive));
}

#[test]
fn cidr_range_contains_its_address() {
    let addr = Ipv4Addr::new(172, 16, 5, 77);
    for prefix in 0..=32u8 {
        let (low, high) = net::cidr_range(addr, prefix).unwrap();
        let a = net::to_u32(addr);
        assert!(net::to_u32(low) <= a && a <= net::to_u32(high));
        let mask = net::to_u32(net::cidr_mask(prefix).unwrap());
        assert_eq!(net::to_u32(low), a & mask);
    }
}
