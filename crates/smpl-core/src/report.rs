//! # smpl-core::report
//!
//! Renders the kernel's facility statistics as a fixed-width textual table,
//! in the vein of `ftsim-cli`'s `list-protocols` table but driven entirely
//! off the kernel's own accessors rather than a static registry.

use crate::kernel::Kernel;
use smpl_types::Token;

/// Builds the textual statistics report for every registered facility.
pub fn render<Tok: Token>(kernel: &Kernel<Tok>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "smpl kernel report -- model {:?} -- time {:.3}\n",
        kernel.mname(),
        kernel.time()
    ));
    out.push_str(&format!(
        "{:<16} {:>8} {:>10} {:>10} {:>10} {:>8} {:>8}\n",
        "FACILITY", "SERVERS", "U", "B", "Lq", "INQ", "PREEMPT"
    ));
    out.push_str(&format!("{:-<16} {:->8} {:->10} {:->10} {:->10} {:->8} {:->8}\n", "", "", "", "", "", "", ""));

    for fid in kernel.facility_ids() {
        let name = kernel.fname(fid).unwrap_or("?");
        let servers = kernel.num_servers(fid).unwrap_or(0);
        let u = kernel.u(fid).unwrap_or(0.0);
        let b = kernel.b(fid).unwrap_or(0.0);
        let lq = kernel.lq(fid).unwrap_or(0.0);
        let inq = kernel.inq(fid).unwrap_or(0);
        let preempts = kernel.preempt_count(fid).unwrap_or(0);
        out.push_str(&format!(
            "{:<16} {:>8} {:>10.4} {:>10.4} {:>10.4} {:>8} {:>8}\n",
            name, servers, u, b, lq, inq, preempts
        ));
    }

    out
}
