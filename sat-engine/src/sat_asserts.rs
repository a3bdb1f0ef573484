#[cfg(any(test, feature = "debug-checks"))]
pub const SAT_ASSERT_LEVEL_DEFINITION: u8 = SAT_ASSERT_MODERATE;
#[cfg(not(any(test, feature = "debug-checks")))]
pub const SAT_ASSERT_LEVEL_DEFINITION: u8 = SAT_ASSERT_SIMPLE;

pub const SAT_ASSERT_SIMPLE: u8 = 1;
pub const SAT_ASSERT_MODERATE: u8 = 2;
pub const SAT_ASSERT_ADVANCED: u8 = 3;
pub const SAT_ASSERT_EXTREME: u8 = 4;

#[macro_export]
#[doc(hidden)]
macro_rules! sat_assert_simple {
    ($($arg:tt)*) => {
        if $crate::asserts::SAT_ASSERT_LEVEL_DEFINITION >= $crate::asserts::SAT_ASSERT_SIMPLE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! sat_assert_eq_simple {
    ($($arg:tt)*) => {
        if $crate::asserts::SAT_ASSERT_LEVEL_DEFINITION >= $crate::asserts::SAT_ASSERT_SIMPLE {
            assert_eq!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! sat_assert_moderate {
    ($($arg:tt)*) => {
        if $crate::asserts::SAT_ASSERT_LEVEL_DEFINITION >= $crate::asserts::SAT_ASSERT_MODERATE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! sat_assert_advanced {
    ($($arg:tt)*) => {
        if $crate::asserts::SAT_ASSERT_LEVEL_DEFINITION >= $crate::asserts::SAT_ASSERT_ADVANCED {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! sat_assert_extreme {
    ($($arg:tt)*) => {
        if $crate::asserts::SAT_ASSERT_LEVEL_DEFINITION >= $crate::asserts::SAT_ASSERT_EXTREME {
            assert!($($arg)*);
        }
    };
}
