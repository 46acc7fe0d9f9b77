//! The three optional post-run reports: page tables, the frame table, and the cost summary.
//!
//! Free functions over `&Simulator` and an `impl Write`, kept separate from `Simulator` itself so
//! the mandated trace and these reports share no buffering surprises and both can be redirected to
//! an in-memory sink in tests.

use std::io::{self, Write};

use crate::pte::Pte;
use crate::sim::Simulator;

pub fn print_page_tables(sim: &Simulator, out: &mut impl Write) -> io::Result<()> {
    for process in sim.processes() {
        write!(out, "PT[{}]:", process.pid())?;
        for (vpage, pte) in process.page_table().iter().enumerate() {
            if pte.valid() {
                write!(
                    out,
                    " {}:{}{}{}",
                    vpage,
                    if pte.referenced() { 'R' } else { '-' },
                    if pte.modified() { 'M' } else { '-' },
                    if pte.pagedout() { 'S' } else { '-' },
                )?;
            } else if pte.pagedout() {
                write!(out, " #")?;
            } else {
                write!(out, " *")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn print_frame_table(sim: &Simulator, out: &mut impl Write) -> io::Result<()> {
    write!(out, "FT:")?;
    for (_, frame) in sim.frame_table().iter() {
        match frame.owner() {
            Some((pid, vpage)) => write!(out, " {}:{}", pid, vpage)?,
            None => write!(out, " *")?,
        }
    }
    writeln!(out)
}

pub fn print_summary(sim: &Simulator, out: &mut impl Write) -> io::Result<()> {
    for process in sim.processes() {
        let c = process.counters();
        writeln!(
            out,
            "PROC[{}]: U={} M={} I={} O={} FI={} FO={} Z={} SV={} SP={}",
            process.pid(),
            c.unmaps,
            c.maps,
            c.ins,
            c.outs,
            c.fins,
            c.fouts,
            c.zeros,
            c.segv,
            c.segprot,
        )?;
    }
    writeln!(
        out,
        "TOTALCOST {} {} {} {} {}",
        sim.inst_count(),
        sim.ctx_switches(),
        sim.process_exits(),
        sim.cost(),
        std::mem::size_of::<Pte>(),
    )
}
