//! Named scenarios exercised against a fresh [`Vmm`] each.

use pagesim_alloc::addresses::{PAGE_COUNT, PAGE_SHIFT, PhysicalFrame, VirtualPage};
use pagesim_alloc::{Flags, StatsSnapshot, VmError, Vmm};

/// One check result: passed, and what was checked.
pub type Check = (bool, &'static str);

/// Results of one workload.
#[derive(Debug, Default)]
pub struct Checks {
    results: Vec<Check>,
}

impl Checks {
    fn check(&mut self, ok: bool, what: &'static str) {
        self.results.push((ok, what));
    }

    pub fn iter(&self) -> impl Iterator<Item = Check> + '_ {
        self.results.iter().copied()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|(ok, _)| !ok).count()
    }
}

#[derive(Debug)]
pub struct Outcome {
    pub checks: Checks,
    pub stats: StatsSnapshot,
}

#[derive(Debug)]
pub struct Workload {
    pub name: &'static str,
    pub title: &'static str,
    body: fn(&mut Vmm, &mut Checks),
}

impl Workload {
    /// Run on a freshly initialised manager. Statistics are taken before
    /// teardown.
    pub fn run(&self) -> Outcome {
        let mut vmm = Vmm::new();
        let mut checks = Checks::default();
        (self.body)(&mut vmm, &mut checks);
        let stats = vmm.stats();
        vmm.teardown();
        Outcome { checks, stats }
    }
}

pub static ALL: [Workload; 10] = [
    Workload {
        name: "demo",
        title: "Demo",
        body: demo,
    },
    Workload {
        name: "basic",
        title: "Basic Read/Write",
        body: basic,
    },
    Workload {
        name: "faults",
        title: "Page Fault Handling",
        body: faults,
    },
    Workload {
        name: "permissions",
        title: "Permission Checking",
        body: permissions,
    },
    Workload {
        name: "bounds",
        title: "Bounds Checking",
        body: bounds,
    },
    Workload {
        name: "boundaries",
        title: "Page Boundary Handling",
        body: boundaries,
    },
    Workload {
        name: "unmap",
        title: "Page Unmapping",
        body: unmap,
    },
    Workload {
        name: "bulk",
        title: "Multiple Pages and Large Transfers",
        body: bulk,
    },
    Workload {
        name: "exhaust",
        title: "Physical Memory Exhaustion",
        body: exhaust,
    },
    Workload {
        name: "two-level",
        title: "Two-Level Table Structure",
        body: two_level,
    },
];

pub fn find(name: &str) -> Option<&'static Workload> {
    ALL.iter().find(|w| w.name == name)
}

fn page_base(page: u16) -> u32 {
    u32::from(page) << PAGE_SHIFT
}

fn frame_of(vmm: &Vmm, page: u16) -> Option<PhysicalFrame> {
    let (frame, _) = vmm.mapping(VirtualPage::from_index(page)?)?;
    Some(frame)
}

fn demo(vmm: &mut Vmm, c: &mut Checks) {
    c.check(vmm.map(0x00, 42, Flags::READ_WRITE).is_ok(), "Map page 0x00 to frame 42");
    c.check(vmm.write_byte(0x00_0510, 0xAB).is_ok(), "Write 0xAB at 0x000510");
    c.check(vmm.read_byte(0x00_0510) == Ok(0xAB), "Read 0xAB back from 0x000510");

    c.check(vmm.write_byte(0x01_00AB, 0xDE).is_ok(), "Write to untouched page 0x10");
    c.check(vmm.read_byte(0x01_00AB) == Ok(0xDE), "Read back from page 0x10");
    c.check(vmm.stats().page_faults == 1, "Exactly one page fault");
}

fn basic(vmm: &mut Vmm, c: &mut Checks) {
    c.check(vmm.map(0x00, 10, Flags::READ_WRITE).is_ok(), "Map page 0x00 to frame 10");
    c.check(vmm.write_byte(0x00_0100, 0xAA).is_ok(), "Write to mapped page");
    c.check(vmm.read_byte(0x00_0100) == Ok(0xAA), "Read returns correct value");
}

fn faults(vmm: &mut Vmm, c: &mut Checks) {
    let before = vmm.stats().page_faults;
    c.check(vmm.write_byte(0x00_5000, 0xBB).is_ok(), "Page fault handled successfully");
    c.check(vmm.stats().page_faults == before + 1, "Page fault counter incremented");

    let before = vmm.stats().page_faults;
    c.check(vmm.read_byte(0x00_5000) == Ok(0xBB), "No fault on second access");
    c.check(vmm.stats().page_faults == before, "No additional page fault");
    c.check(
        vmm.read_byte(0x00_5FFF) == Ok(0),
        "Faulted page is otherwise zero-filled",
    );
}

fn permissions(vmm: &mut Vmm, c: &mut Checks) {
    // read-only, with a byte planted directly in the store
    let ro_frame = PhysicalFrame::from_u8(20);
    c.check(vmm.map(0x01, 20, Flags::READ).is_ok(), "Map page 0x01 read-only");
    vmm.physical_store_mut().frame_mut(ro_frame)[50] = 0xCC;
    c.check(vmm.read_byte(0x00_1032) == Ok(0xCC), "Read from read-only page succeeds");
    c.check(
        vmm.write_byte(0x00_1032, 0xDD) == Err(VmError::PermissionDenied),
        "Write to read-only page fails",
    );
    c.check(
        vmm.physical_store().frame(ro_frame)[50] == 0xCC,
        "Denied write leaves memory unchanged",
    );

    c.check(vmm.map(0x02, 21, Flags::WRITE).is_ok(), "Map page 0x02 write-only");
    c.check(vmm.write_byte(0x00_2100, 0xEE).is_ok(), "Write to write-only page succeeds");
    c.check(
        vmm.read_byte(0x00_2100) == Err(VmError::PermissionDenied),
        "Read from write-only page fails",
    );

    c.check(vmm.map(0x03, 22, Flags::READ_WRITE).is_ok(), "Map page 0x03 read-write");
    c.check(vmm.write_byte(0x00_3200, 0xFF).is_ok(), "Write to RW page succeeds");
    c.check(vmm.read_byte(0x00_3200) == Ok(0xFF), "Read from RW page succeeds");

    c.check(vmm.stats().page_faults == 0, "Permission failures never fault");
}

fn bounds(vmm: &mut Vmm, c: &mut Checks) {
    c.check(
        vmm.write_byte(0x20_0000, 0x11) == Err(VmError::OutOfRange),
        "Reject address beyond virtual space",
    );
    c.check(
        vmm.read_byte(0x10_0000) == Err(VmError::OutOfRange),
        "Reject first address past the end",
    );
    c.check(
        vmm.map(0x04, 999, Flags::READ_WRITE) == Err(VmError::OutOfRange),
        "Reject invalid physical frame",
    );
    c.check(
        vmm.map(0xFFF, 30, Flags::READ_WRITE) == Err(VmError::OutOfRange),
        "Reject invalid virtual page",
    );
    c.check(
        vmm.address_space().table_count() == 0,
        "Rejected mappings leave the tables untouched",
    );
    c.check(vmm.stats().page_faults == 0, "Out-of-range accesses never fault");
}

fn boundaries(vmm: &mut Vmm, c: &mut Checks) {
    c.check(vmm.map(0x05, 30, Flags::READ_WRITE).is_ok(), "Map page 0x05 to frame 30");

    c.check(vmm.write_byte(0x00_5000, 0x11).is_ok(), "Write at page start");
    c.check(vmm.read_byte(0x00_5000) == Ok(0x11), "Access at page start");

    c.check(vmm.write_byte(0x00_5FFF, 0x22).is_ok(), "Write at page end");
    c.check(vmm.read_byte(0x00_5FFF) == Ok(0x22), "Access at page end");

    c.check(
        vmm.write_byte(0x00_6000, 0x33).is_ok(),
        "Adjacent unmapped page is demand-paged",
    );
    c.check(
        frame_of(vmm, 0x06).is_some_and(|f| f.as_u8() != 30),
        "Adjacent page gets its own frame",
    );
    c.check(vmm.read_byte(0x00_5FFF) == Ok(0x22), "Page end unaffected");
}

fn unmap(vmm: &mut Vmm, c: &mut Checks) {
    c.check(vmm.map(0x06, 40, Flags::READ_WRITE).is_ok(), "Map page 0x06 to frame 40");
    c.check(vmm.write_byte(0x00_6100, 0x44).is_ok(), "Write to mapped page");
    c.check(vmm.read_byte(0x00_6100) == Ok(0x44), "Read from mapped page");

    c.check(vmm.unmap(0x06).is_ok(), "Unmap page 0x06");
    c.check(frame_of(vmm, 0x06).is_none(), "Mapping is gone");

    let before = vmm.stats().page_faults;
    c.check(
        vmm.read_byte(0x00_6100) == Ok(0),
        "Next access sees a fresh zero-filled page",
    );
    c.check(vmm.stats().page_faults == before + 1, "Exactly one new fault");
}

fn bulk(vmm: &mut Vmm, c: &mut Checks) {
    let all_written = (0..10_u8).all(|i| vmm.write_byte(page_base(u16::from(i)), i).is_ok());
    c.check(all_written, "Write to 10 untouched pages");
    let all_correct = (0..10_u8).all(|i| vmm.read_byte(page_base(u16::from(i))) == Ok(i));
    c.check(all_correct, "All 10 pages read/write correctly");

    let pattern = |addr: u32| (addr >> 8).to_le_bytes()[0];
    let pattern_written = (0..0x1_0000)
        .step_by(256)
        .all(|addr| vmm.write_byte(addr, pattern(addr)).is_ok());
    c.check(pattern_written, "Write pattern across 16 pages");
    let pattern_correct = (0..0x1_0000)
        .step_by(256)
        .all(|addr| vmm.read_byte(addr) == Ok(pattern(addr)));
    c.check(pattern_correct, "Large sequential data transfer correct");
    c.check(vmm.stats().page_faults == 16, "One fault per touched page");
}

fn exhaust(vmm: &mut Vmm, c: &mut Checks) {
    let mut allocated = 0;
    for page in 0..(PAGE_COUNT + 10) {
        let Ok(page) = u16::try_from(page) else { break };
        if vmm.write_byte(page_base(page), page.to_le_bytes()[0]).is_err() {
            break;
        }
        allocated += 1;
    }
    c.check(allocated == PAGE_COUNT, "Allocated all available physical frames");
    c.check(vmm.stats().frames_used == 256, "Every frame in use");

    // reclaim one page's frame outside the page tables
    c.check(vmm.unmap(0x00).is_ok(), "Unmap page 0x00");
    c.check(
        vmm.allocate_frame() == Ok(PhysicalFrame::from_u8(0)),
        "Claim the released frame directly",
    );
    c.check(
        vmm.write_byte(page_base(0x00), 0x99) == Err(VmError::OutOfMemory),
        "Allocation fails when memory exhausted",
    );
    c.check(frame_of(vmm, 0x00).is_none(), "Failed fault leaves page unmapped");

    let intact = (1..256_u16)
        .all(|page| vmm.read_byte(page_base(page)) == Ok(page.to_le_bytes()[0]));
    c.check(intact, "Existing pages remain accessible");
}

fn two_level(vmm: &mut Vmm, c: &mut Checks) {
    // L1=0/L2=0, L1=1/L2=15, L1=10/L2=11
    let mapped = vmm.map(0x00, 50, Flags::READ_WRITE).is_ok()
        && vmm.map(0x1F, 51, Flags::READ_WRITE).is_ok()
        && vmm.map(0xAB, 52, Flags::READ_WRITE).is_ok();
    c.check(mapped, "Map pages 0x00, 0x1F and 0xAB");

    let written = vmm.write_byte(0x00_0100, 0xAA).is_ok()
        && vmm.write_byte(0x01_F200, 0xBB).is_ok()
        && vmm.write_byte(0x0A_B300, 0xCC).is_ok();
    c.check(written, "Write one byte to each page");

    let ok = vmm.read_byte(0x00_0100) == Ok(0xAA)
        && vmm.read_byte(0x01_F200) == Ok(0xBB)
        && vmm.read_byte(0x0A_B300) == Ok(0xCC);
    c.check(ok, "Pages in different L1/L2 entries work correctly");
    c.check(vmm.address_space().table_count() == 3, "One level-2 table per L1 slot");
}
