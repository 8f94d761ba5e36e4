use pagesim_alloc::{Flags, VmError, Vmm};
use proptest::prelude::*;

const SPACE: u32 = 0x10_0000;

proptest! {
    #[test]
    fn written_byte_reads_back(addr in 0..SPACE, value in any::<u8>()) {
        let mut vmm = Vmm::new();
        vmm.write_byte(addr, value).unwrap();
        prop_assert_eq!(vmm.read_byte(addr), Ok(value));
    }

    #[test]
    fn each_page_faults_once(addrs in prop::collection::vec(0..SPACE, 1..64)) {
        let mut vmm = Vmm::new();
        for &addr in &addrs {
            vmm.read_byte(addr).unwrap();
        }

        let mut pages: Vec<u32> = addrs.iter().map(|a| a >> 12).collect();
        pages.sort_unstable();
        pages.dedup();
        let s = vmm.stats();
        prop_assert_eq!(s.page_faults as usize, pages.len());
        prop_assert_eq!(s.frames_used as usize, pages.len());
        prop_assert_eq!(s.reads as usize, addrs.len());
    }

    #[test]
    fn out_of_range_never_changes_state(addr in SPACE.., value in any::<u8>()) {
        let mut vmm = Vmm::new();
        prop_assert_eq!(vmm.write_byte(addr, value), Err(VmError::OutOfRange));
        prop_assert_eq!(vmm.read_byte(addr), Err(VmError::OutOfRange));
        let s = vmm.stats();
        prop_assert_eq!(s.page_faults, 0);
        prop_assert_eq!(s.frames_used, 0);
        prop_assert_eq!(vmm.address_space().table_count(), 0);
    }

    #[test]
    fn read_only_pages_stay_unchanged(page in 0..256_u16, offset in 0..0x1000_u32, value in any::<u8>()) {
        let mut vmm = Vmm::new();
        vmm.map(page, 200, Flags::READ).unwrap();
        let addr = (u32::from(page) << 12) | offset;

        prop_assert_eq!(vmm.write_byte(addr, value), Err(VmError::PermissionDenied));
        prop_assert_eq!(vmm.read_byte(addr), Ok(0));
    }
}
