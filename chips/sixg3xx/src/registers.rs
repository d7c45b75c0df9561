// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Register layouts of the clock management unit, the oscillators and the PLLs.
//!
//! Every peripheral has its own module holding its bitfields and a register block struct. A
//! register block is built from a [RegisterBus] and the peripheral base address found in the
//! capability descriptor of the running part.

use crate::bus::RegisterBus;

macro_rules! register_block {
    (
        $(#[$attr:meta])*
        $name:ident {
            $( ($offset:expr => $field:ident: $reg:path) ),* $(,)?
        }
    ) => {
        $(#[$attr])*
        pub struct $name<'a> {
            $( pub $field: $crate::bus::Register<'a, $reg>, )*
        }

        impl<'a> $name<'a> {
            pub fn new(bus: &'a dyn RegisterBus, base: usize) -> Self {
                Self {
                    $( $field: $crate::bus::Register::new(bus, base + $offset), )*
                }
            }
        }
    };
}

pub mod cmu {
    use super::RegisterBus;
    use tock_registers::register_bitfields;

    register_bitfields![u32,
        pub STATUS [
            /// Calibration ready
            CALRDY OFFSET(0) NUMBITS(1) []
        ],
        pub CALCMD [
            CALSTART OFFSET(0) NUMBITS(1) [],
            CALSTOP OFFSET(1) NUMBITS(1) []
        ],
        pub CALCTRL [
            /// Continuous calibration
            CONT OFFSET(23) NUMBITS(1) [],
            /// Up-counter clock
            UPSEL OFFSET(24) NUMBITS(4) [
                DISABLED = 0,
                PRS = 1,
                HFXO = 2,
                LFXO = 3,
                HFRCODPLL = 4,
                HFRCOEM23 = 5,
                FSRCO = 6,
                LFRCO = 7,
                ULFRCO = 8
            ],
            /// Down-counter clock
            DOWNSEL OFFSET(28) NUMBITS(4) [
                DISABLED = 0,
                HCLK = 1,
                PRS = 2,
                HFXO = 3,
                LFXO = 4,
                HFRCODPLL = 5,
                HFRCOEM23 = 6,
                FSRCO = 7,
                LFRCO = 8,
                ULFRCO = 9
            ]
        ],
        pub CALCNT [
            CALCNT OFFSET(0) NUMBITS(20) []
        ],
        pub CALTOP [
            CALTOP OFFSET(0) NUMBITS(20) []
        ],
        pub CLKEN0 [
            LDMA OFFSET(0) NUMBITS(1) [],
            GPCRC0 OFFSET(3) NUMBITS(1) [],
            TIMER0 OFFSET(4) NUMBITS(1) [],
            IADC0 OFFSET(10) NUMBITS(1) [],
            WDOG0 OFFSET(13) NUMBITS(1) [],
            I2C0 OFFSET(14) NUMBITS(1) [],
            SYSCFG OFFSET(16) NUMBITS(1) [],
            DPLL0 OFFSET(17) NUMBITS(1) [],
            HFRCO0 OFFSET(18) NUMBITS(1) [],
            HFRCOEM23 OFFSET(19) NUMBITS(1) [],
            HFXO0 OFFSET(20) NUMBITS(1) [],
            FSRCO OFFSET(21) NUMBITS(1) [],
            LFRCO OFFSET(22) NUMBITS(1) [],
            LFXO OFFSET(23) NUMBITS(1) [],
            ULFRCO OFFSET(24) NUMBITS(1) [],
            EUSART0 OFFSET(25) NUMBITS(1) [],
            PCNT0 OFFSET(26) NUMBITS(1) []
        ],
        pub CLKEN1 [
            SYSRTC0 OFFSET(3) NUMBITS(1) [],
            WDOG1 OFFSET(4) NUMBITS(1) [],
            SOCPLL0 OFFSET(8) NUMBITS(1) [],
            QSPI0 OFFSET(9) NUMBITS(1) [],
            PIXELRZ0 OFFSET(10) NUMBITS(1) []
        ],
        pub SYSCLKCTRL [
            CLKSEL OFFSET(0) NUMBITS(3) [
                FSRCO = 1,
                HFRCODPLL = 2,
                HFXO = 3,
                CLKIN0 = 4,
                SOCPLL = 5
            ],
            PCLKPRESC OFFSET(10) NUMBITS(1) [
                DIV1 = 0,
                DIV2 = 1
            ],
            HCLKPRESC OFFSET(12) NUMBITS(4) [
                DIV1 = 0,
                DIV2 = 1,
                DIV4 = 3,
                DIV8 = 7,
                DIV16 = 15
            ]
        ],
        pub TRACECLKCTRL [
            CLKSEL OFFSET(0) NUMBITS(2) [
                DISABLE = 0,
                SYSCLK = 1,
                HFRCOEM23 = 2,
                HFRCODPLLRT = 3
            ],
            PRESC OFFSET(4) NUMBITS(2) [
                DIV1 = 0,
                DIV2 = 1,
                DIV4 = 3
            ]
        ],
        pub EXPORTCLKCTRL [
            PRESC OFFSET(24) NUMBITS(5) []
        ],
        pub DPLLREFCLKCTRL [
            CLKSEL OFFSET(0) NUMBITS(2) [
                DISABLED = 0,
                HFXO = 1,
                LFXO = 2,
                CLKIN0 = 3
            ]
        ],
        pub EM01GRPACLKCTRL [
            CLKSEL OFFSET(0) NUMBITS(3) [
                HFRCODPLL = 1,
                HFXO = 2,
                HFRCOEM23 = 3,
                FSRCO = 4,
                HFRCODPLLRT = 5,
                HFXORT = 6
            ]
        ],
        pub EM01GRPCCLKCTRL [
            CLKSEL OFFSET(0) NUMBITS(3) [
                HFRCODPLL = 1,
                HFXO = 2,
                HFRCOEM23 = 3,
                FSRCO = 4,
                HFRCODPLLRT = 5,
                HFXORT = 6
            ]
        ],
        pub EM01GRPDCLKCTRL [
            CLKSEL OFFSET(0) NUMBITS(3) [
                HFRCODPLL = 1,
                HFXO = 2,
                HFRCOEM23 = 3,
                FSRCO = 4
            ]
        ],
        pub EM23GRPACLKCTRL [
            CLKSEL OFFSET(0) NUMBITS(2) [
                LFRCO = 1,
                LFXO = 2,
                ULFRCO = 3
            ]
        ],
        pub EM4GRPACLKCTRL [
            CLKSEL OFFSET(0) NUMBITS(2) [
                LFRCO = 1,
                LFXO = 2,
                ULFRCO = 3
            ]
        ],
        pub ADCCLKCTRL [
            CLKSEL OFFSET(0) NUMBITS(2) [
                EM01GRPACLK = 1,
                FSRCO = 2,
                HFRCOEM23 = 3
            ]
        ],
        pub WDOG0CLKCTRL [
            CLKSEL OFFSET(0) NUMBITS(3) [
                LFRCO = 1,
                LFXO = 2,
                ULFRCO = 3,
                HCLKDIV1024 = 4
            ]
        ],
        pub EUSART0CLKCTRL [
            CLKSEL OFFSET(0) NUMBITS(3) [
                EM01GRPCCLK = 1,
                HFRCOEM23 = 2,
                LFRCO = 3,
                LFXO = 4
            ]
        ],
        pub SYSRTC0CLKCTRL [
            CLKSEL OFFSET(0) NUMBITS(2) [
                LFRCO = 1,
                LFXO = 2,
                ULFRCO = 3
            ]
        ],
        pub PCNT0CLKCTRL [
            CLKSEL OFFSET(0) NUMBITS(2) [
                EM23GRPACLK = 1,
                PCNTS0 = 2
            ]
        ],
        pub I2C0CLKCTRL [
            CLKSEL OFFSET(0) NUMBITS(3) [
                EM01GRPDCLK = 1,
                HFRCOEM23 = 2,
                LFRCO = 3,
                LFXO = 4
            ]
        ],
        pub PIXELRZCLKCTRL [
            CLKSEL OFFSET(0) NUMBITS(3) [
                HFRCODPLL = 1,
                HFXO = 2,
                FSRCO = 3,
                HFRCOEM23 = 4
            ],
            PRESC OFFSET(4) NUMBITS(2) []
        ],
        pub QSPISYSCLKCTRL [
            CLKSEL OFFSET(0) NUMBITS(2) [
                HFRCODPLL = 1,
                HFXO = 2,
                SOCPLL = 3
            ],
            PRESC OFFSET(4) NUMBITS(2) []
        ],
        pub FLPLLREFCLKCTRL [
            CLKSEL OFFSET(0) NUMBITS(2) [
                HFRCODPLLRT = 1,
                CLKIN0 = 2
            ],
            PRESC OFFSET(4) NUMBITS(2) []
        ]
    ];

    register_block! {
        /// Clock management unit
        CmuRegisters {
            (0x008 => status: STATUS::Register),
            (0x050 => calcmd: CALCMD::Register),
            (0x054 => calctrl: CALCTRL::Register),
            (0x058 => calcnt: CALCNT::Register),
            (0x05C => caltop: CALTOP::Register),
            (0x064 => clken0: CLKEN0::Register),
            (0x068 => clken1: CLKEN1::Register),
            (0x070 => sysclkctrl: SYSCLKCTRL::Register),
            (0x080 => traceclkctrl: TRACECLKCTRL::Register),
            (0x090 => exportclkctrl: EXPORTCLKCTRL::Register),
            (0x100 => dpllrefclkctrl: DPLLREFCLKCTRL::Register),
            (0x120 => em01grpaclkctrl: EM01GRPACLKCTRL::Register),
            (0x128 => em01grpcclkctrl: EM01GRPCCLKCTRL::Register),
            (0x130 => em01grpdclkctrl: EM01GRPDCLKCTRL::Register),
            (0x140 => em23grpaclkctrl: EM23GRPACLKCTRL::Register),
            (0x160 => em4grpaclkctrl: EM4GRPACLKCTRL::Register),
            (0x180 => adcclkctrl: ADCCLKCTRL::Register),
            (0x200 => wdog0clkctrl: WDOG0CLKCTRL::Register),
            (0x220 => eusart0clkctrl: EUSART0CLKCTRL::Register),
            (0x240 => sysrtc0clkctrl: SYSRTC0CLKCTRL::Register),
            (0x270 => pcnt0clkctrl: PCNT0CLKCTRL::Register),
            (0x290 => i2c0clkctrl: I2C0CLKCTRL::Register),
            (0x2A0 => pixelrzclkctrl: PIXELRZCLKCTRL::Register),
            (0x2B0 => qspisysclkctrl: QSPISYSCLKCTRL::Register),
            (0x2C0 => flpllrefclkctrl: FLPLLREFCLKCTRL::Register),
        }
    }
}

pub mod hfxo {
    use super::RegisterBus;
    use tock_registers::register_bitfields;

    register_bitfields![u32,
        pub XTALCFG [
            COREBIASSTARTUPI OFFSET(0) NUMBITS(6) [],
            COREBIASSTARTUP OFFSET(6) NUMBITS(6) [],
            CTUNEXISTARTUP OFFSET(12) NUMBITS(4) [],
            CTUNEXOSTARTUP OFFSET(16) NUMBITS(4) [],
            /// Wait time between core bias optimization and steady state
            TIMEOUTSTEADY OFFSET(20) NUMBITS(4) [
                T4US = 0,
                T16US = 1,
                T41US = 2,
                T83US = 3,
                T125US = 4,
                T166US = 5,
                T208US = 6,
                T250US = 7,
                T333US = 8,
                T416US = 9,
                T500US = 10,
                T666US = 11,
                T833US = 12,
                T1666US = 13,
                T2500US = 14,
                T4166US = 15
            ],
            /// Core bias LSB change timeout during optimization
            TIMEOUTCBLSB OFFSET(24) NUMBITS(4) [
                T8US = 0,
                T20US = 1,
                T41US = 2,
                T62US = 3,
                T83US = 4,
                T104US = 5,
                T125US = 6,
                T166US = 7,
                T208US = 8,
                T250US = 9,
                T333US = 10,
                T416US = 11,
                T833US = 12,
                T1250US = 13,
                T1583US = 14,
                T2083US = 15
            ]
        ],
        pub XTALCTRL [
            COREBIASANA OFFSET(0) NUMBITS(8) [],
            CTUNEXIANA OFFSET(8) NUMBITS(8) [],
            CTUNEXOANA OFFSET(16) NUMBITS(8) [],
            CTUNEFIXANA OFFSET(24) NUMBITS(2) [],
            COREDGENANA OFFSET(26) NUMBITS(2) [],
            SKIPCOREBIASOPT OFFSET(31) NUMBITS(1) []
        ],
        pub CFG [
            MODE OFFSET(0) NUMBITS(2) [
                XTAL = 0,
                EXTCLK = 1,
                EXTCLKPKDET = 2
            ],
            ENXIDCBIASANA OFFSET(2) NUMBITS(1) [],
            SQBUFSCHTRGANA OFFSET(3) NUMBITS(1) []
        ],
        pub CTRL [
            BUFOUTFREEZE OFFSET(0) NUMBITS(1) [],
            KEEPWARM OFFSET(2) NUMBITS(1) [],
            EM23ONDEMAND OFFSET(3) NUMBITS(1) [],
            FORCEXI2GNDANA OFFSET(4) NUMBITS(1) [],
            FORCEXO2GNDANA OFFSET(5) NUMBITS(1) [],
            FORCECTUNEMAX OFFSET(6) NUMBITS(1) [],
            FORCEEN OFFSET(16) NUMBITS(1) [],
            FORCEENBUFOUT OFFSET(17) NUMBITS(1) [],
            DISONDEMAND OFFSET(18) NUMBITS(1) [],
            DISONDEMANDBUFOUT OFFSET(19) NUMBITS(1) []
        ],
        pub CMD [
            COREBIASOPT OFFSET(0) NUMBITS(1) [],
            MANUALOVERRIDE OFFSET(1) NUMBITS(1) []
        ],
        pub STATUS [
            RDY OFFSET(0) NUMBITS(1) [],
            COREBIASOPTRDY OFFSET(1) NUMBITS(1) [],
            PRSRDY OFFSET(2) NUMBITS(1) [],
            BUFOUTRDY OFFSET(3) NUMBITS(1) [],
            ENS OFFSET(16) NUMBITS(1) [],
            HWREQ OFFSET(17) NUMBITS(1) [],
            ISWARM OFFSET(19) NUMBITS(1) [],
            SYNCBUSY OFFSET(30) NUMBITS(1) [],
            LOCK OFFSET(31) NUMBITS(1) []
        ],
        pub INTERRUPT [
            RDY OFFSET(0) NUMBITS(1) [],
            COREBIASOPTRDY OFFSET(1) NUMBITS(1) [],
            DNSERR OFFSET(29) NUMBITS(1) [],
            COREBIASOPTERR OFFSET(31) NUMBITS(1) []
        ],
        pub LOCK [
            LOCKKEY OFFSET(0) NUMBITS(16) []
        ]
    ];

    register_block! {
        /// High-frequency crystal oscillator
        HfxoRegisters {
            (0x010 => xtalcfg: XTALCFG::Register),
            (0x018 => xtalctrl: XTALCTRL::Register),
            (0x020 => cfg: CFG::Register),
            (0x028 => ctrl: CTRL::Register),
            (0x050 => cmd: CMD::Register),
            (0x058 => status: STATUS::Register),
            (0x070 => if_: INTERRUPT::Register),
            (0x074 => ien: INTERRUPT::Register),
            (0x080 => lock: LOCK::Register),
        }
    }

    /// Writing this key to LOCK unlocks the register interface
    pub const UNLOCK_KEY: u32 = 0x580E;
}

pub mod lfxo {
    use super::RegisterBus;
    use tock_registers::register_bitfields;

    register_bitfields![u32,
        pub CTRL [
            FORCEEN OFFSET(0) NUMBITS(1) [],
            DISONDEMAND OFFSET(1) NUMBITS(1) [],
            FAILDETEM4WUEN OFFSET(4) NUMBITS(1) [],
            FAILDETEN OFFSET(5) NUMBITS(1) []
        ],
        pub CFG [
            AGC OFFSET(0) NUMBITS(1) [],
            HIGHAMPL OFFSET(1) NUMBITS(1) [],
            MODE OFFSET(4) NUMBITS(2) [
                XTAL = 0,
                BUFEXTCLK = 1,
                DIGEXTCLK = 2
            ],
            TIMEOUT OFFSET(8) NUMBITS(3) [
                CYCLES2 = 0,
                CYCLES256 = 1,
                CYCLES1K = 2,
                CYCLES2K = 3,
                CYCLES4K = 4,
                CYCLES8K = 5,
                CYCLES16K = 6,
                CYCLES32K = 7
            ]
        ],
        pub STATUS [
            RDY OFFSET(0) NUMBITS(1) [],
            ENS OFFSET(16) NUMBITS(1) [],
            LOCK OFFSET(31) NUMBITS(1) []
        ],
        pub CAL [
            CAPTUNE OFFSET(0) NUMBITS(7) [],
            GAIN OFFSET(8) NUMBITS(2) []
        ],
        pub SYNCBUSY [
            START OFFSET(0) NUMBITS(1) [],
            STOP OFFSET(1) NUMBITS(1) [],
            CAL OFFSET(2) NUMBITS(1) []
        ],
        pub LOCK [
            LOCKKEY OFFSET(0) NUMBITS(16) []
        ]
    ];

    register_block! {
        /// Low-frequency crystal oscillator
        LfxoRegisters {
            (0x004 => ctrl: CTRL::Register),
            (0x008 => cfg: CFG::Register),
            (0x010 => status: STATUS::Register),
            (0x014 => cal: CAL::Register),
            (0x020 => syncbusy: SYNCBUSY::Register),
            (0x024 => lock: LOCK::Register),
        }
    }

    /// Writing this key to LOCK unlocks the register interface
    pub const UNLOCK_KEY: u32 = 0x1A20;
}

/// Shared by HFRCODPLL and HFRCOEM23
pub mod hfrco {
    use super::RegisterBus;
    use tock_registers::register_bitfields;

    register_bitfields![u32,
        pub CTRL [
            FORCEEN OFFSET(0) NUMBITS(1) [],
            DISONDEMAND OFFSET(1) NUMBITS(1) [],
            EM23ONDEMAND OFFSET(2) NUMBITS(1) []
        ],
        pub CAL [
            TUNING OFFSET(0) NUMBITS(7) [],
            FINETUNING OFFSET(8) NUMBITS(6) [],
            LDOHP OFFSET(15) NUMBITS(1) [],
            FREQRANGE OFFSET(16) NUMBITS(5) [],
            CMPBIAS OFFSET(21) NUMBITS(3) [],
            CLKDIV OFFSET(24) NUMBITS(2) [
                DIV1 = 0,
                DIV2 = 1,
                DIV4 = 2
            ],
            CMPSEL OFFSET(26) NUMBITS(2) [],
            IREFTC OFFSET(28) NUMBITS(4) []
        ],
        pub STATUS [
            RDY OFFSET(0) NUMBITS(1) [],
            FREQBSY OFFSET(1) NUMBITS(1) [],
            SYNCBUSY OFFSET(2) NUMBITS(1) [],
            ENS OFFSET(16) NUMBITS(1) [],
            LOCK OFFSET(31) NUMBITS(1) []
        ],
        pub LOCK [
            LOCKKEY OFFSET(0) NUMBITS(16) []
        ]
    ];

    register_block! {
        /// High-frequency RC oscillator
        HfrcoRegisters {
            (0x004 => ctrl: CTRL::Register),
            (0x008 => cal: CAL::Register),
            (0x00C => status: STATUS::Register),
            (0x01C => lock: LOCK::Register),
        }
    }

    /// Writing this key to LOCK unlocks the register interface
    pub const UNLOCK_KEY: u32 = 0x8195;
}

pub mod lfrco {
    use super::RegisterBus;
    use tock_registers::register_bitfields;

    register_bitfields![u32,
        pub CTRL [
            FORCEEN OFFSET(0) NUMBITS(1) [],
            DISONDEMAND OFFSET(1) NUMBITS(1) []
        ],
        pub STATUS [
            RDY OFFSET(0) NUMBITS(1) [],
            ENS OFFSET(16) NUMBITS(1) [],
            LOCK OFFSET(31) NUMBITS(1) []
        ],
        pub SYNCBUSY [
            START OFFSET(0) NUMBITS(1) [],
            STOP OFFSET(1) NUMBITS(1) [],
            CAL OFFSET(2) NUMBITS(1) []
        ],
        pub CFG [
            HIGHPRECEN OFFSET(0) NUMBITS(1) []
        ],
        pub NOMCAL [
            NOMCALCNT OFFSET(0) NUMBITS(21) []
        ],
        pub NOMCALINV [
            NOMCALCNTINV OFFSET(0) NUMBITS(17) []
        ],
        pub CAL [
            FREQTRIM OFFSET(0) NUMBITS(8) []
        ]
    ];

    register_block! {
        /// Low-frequency RC oscillator
        LfrcoRegisters {
            (0x004 => ctrl: CTRL::Register),
            (0x008 => status: STATUS::Register),
            (0x01C => syncbusy: SYNCBUSY::Register),
            (0x024 => cfg: CFG::Register),
            (0x02C => nomcal: NOMCAL::Register),
            (0x030 => nomcalinv: NOMCALINV::Register),
            (0x040 => cal: CAL::Register),
        }
    }
}

pub mod dpll {
    use super::RegisterBus;
    use tock_registers::register_bitfields;

    register_bitfields![u32,
        pub EN [
            EN OFFSET(0) NUMBITS(1) [],
            DISABLING OFFSET(1) NUMBITS(1) []
        ],
        pub CFG [
            MODE OFFSET(0) NUMBITS(1) [
                FLL = 0,
                PLL = 1
            ],
            EDGESEL OFFSET(1) NUMBITS(1) [
                FALL = 0,
                RISE = 1
            ],
            AUTORECOVER OFFSET(2) NUMBITS(1) [],
            DITHEN OFFSET(6) NUMBITS(1) []
        ],
        pub CFG1 [
            M OFFSET(0) NUMBITS(12) [],
            N OFFSET(16) NUMBITS(12) []
        ],
        pub INTERRUPT [
            LOCK OFFSET(0) NUMBITS(1) [],
            LOCKFAILLOW OFFSET(1) NUMBITS(1) [],
            LOCKFAILHIGH OFFSET(2) NUMBITS(1) []
        ],
        pub STATUS [
            RDY OFFSET(0) NUMBITS(1) [],
            ENS OFFSET(1) NUMBITS(1) [],
            LOCK OFFSET(31) NUMBITS(1) []
        ],
        pub LOCK [
            LOCKKEY OFFSET(0) NUMBITS(16) []
        ]
    ];

    register_block! {
        /// Digital phase-locked loop steering HFRCODPLL
        DpllRegisters {
            (0x004 => en: EN::Register),
            (0x008 => cfg: CFG::Register),
            (0x00C => cfg1: CFG1::Register),
            (0x010 => if_: INTERRUPT::Register),
            (0x018 => status: STATUS::Register),
            (0x020 => lock: LOCK::Register),
        }
    }

    /// Writing this key to LOCK unlocks the register interface
    pub const UNLOCK_KEY: u32 = 0x7102;
}

pub mod socpll {
    use super::RegisterBus;
    use tock_registers::register_bitfields;

    register_bitfields![u32,
        pub CTRL [
            FORCEEN OFFSET(0) NUMBITS(1) [],
            DISONDEMAND OFFSET(1) NUMBITS(1) [],
            /// Fractional-N mode
            ENFRACN OFFSET(8) NUMBITS(1) [],
            REFCLKSEL OFFSET(12) NUMBITS(2) [
                REF_HFXO = 0,
                REF_HFRCO = 1,
                REF_EXTCLK = 2
            ]
        ],
        pub CTRL1 [
            DIVN OFFSET(0) NUMBITS(7) [],
            DIVF OFFSET(16) NUMBITS(10) []
        ],
        pub STATUS [
            RDY OFFSET(0) NUMBITS(1) [],
            PLLLOCK OFFSET(1) NUMBITS(1) [],
            ENS OFFSET(16) NUMBITS(1) [],
            SYNCBUSY OFFSET(30) NUMBITS(1) [],
            LOCK OFFSET(31) NUMBITS(1) []
        ],
        pub LOCK [
            LOCKKEY OFFSET(0) NUMBITS(16) []
        ]
    ];

    register_block! {
        /// Fractional system PLL
        SocpllRegisters {
            (0x004 => ctrl: CTRL::Register),
            (0x008 => ctrl1: CTRL1::Register),
            (0x010 => status: STATUS::Register),
            (0x020 => lock: LOCK::Register),
        }
    }

    /// Writing this key to LOCK unlocks the register interface
    pub const UNLOCK_KEY: u32 = 0x81A3;
}

pub mod syscfg {
    use super::RegisterBus;
    use tock_registers::register_bitfields;

    register_bitfields![u32,
        pub CFGSYSTIC [
            /// Route EM23GRPACLK to the SysTick external clock input
            SYSTICEXTCLKEN OFFSET(0) NUMBITS(1) []
        ]
    ];

    register_block! {
        SyscfgRegisters {
            (0x00C => cfgsystic: CFGSYSTIC::Register),
        }
    }
}

pub mod systick {
    use super::RegisterBus;
    use tock_registers::register_bitfields;

    register_bitfields![u32,
        pub CSR [
            ENABLE OFFSET(0) NUMBITS(1) [],
            TICKINT OFFSET(1) NUMBITS(1) [],
            /// Set: processor clock (HCLK). Clear: external reference clock.
            CLKSOURCE OFFSET(2) NUMBITS(1) [],
            COUNTFLAG OFFSET(16) NUMBITS(1) []
        ]
    ];

    register_block! {
        SysTickRegisters {
            (0x000 => csr: CSR::Register),
        }
    }
}
