// Library logging. With the `rtt` feature this is `rprintln!`, otherwise the
// arguments are type checked and dropped.

#[cfg(feature = "rtt")]
macro_rules! trace {
    ($($arg:tt)*) => {
        rtt_target::rprintln!($($arg)*)
    };
}

#[cfg(not(feature = "rtt"))]
macro_rules! trace {
    ($($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}
